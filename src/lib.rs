//! Boardfund - Donation management service
//!
//! This crate implements the payment-provider boundary of the donation
//! service: cached provider credentials, webhook signature verification, and
//! fund deactivation that reconciles local donations with remote
//! subscriptions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
