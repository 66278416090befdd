//! PostgreSQL adapters.
//!
//! Schema lives in `migrations/`.

mod donation_store;

pub use donation_store::PostgresDonationStore;
