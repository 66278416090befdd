//! Fund lifecycle handlers.

mod deactivate_fund;

pub use deactivate_fund::{
    CompensationFailure, DeactivateFundCommand, DeactivateFundError, DeactivateFundHandler,
    DeactivateFundResult,
};
