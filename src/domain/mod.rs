//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `donation` - Funds, donations and recorded payments
//! - `webhook` - Provider notification trust and event envelope

pub mod donation;
pub mod foundation;
pub mod webhook;
