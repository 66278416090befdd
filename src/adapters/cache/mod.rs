//! In-process caching.

mod expiring_store;

pub use expiring_store::{ExpiringStore, DEFAULT_SWEEP_INTERVAL};
