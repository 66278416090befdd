//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - In-process expiring key-value store
//! - `events` - Bounded webhook event dispatch
//! - `http` - Axum routers (webhooks, admin, health)
//! - `memory` - In-memory donation store
//! - `paypal` - PayPal REST, OAuth2 and certificate adapters
//! - `postgres` - PostgreSQL donation store

pub mod cache;
pub mod events;
pub mod http;
pub mod memory;
pub mod paypal;
pub mod postgres;

pub use cache::ExpiringStore;
pub use events::WebhookDispatcher;
pub use memory::InMemoryDonationStore;
pub use postgres::PostgresDonationStore;
