//! In-memory adapters for development and tests.

mod donation_store;

pub use donation_store::InMemoryDonationStore;
