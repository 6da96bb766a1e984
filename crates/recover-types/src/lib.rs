//! Shared types for the recover-check workspace.
//!
//! This crate holds the domain types passed between the account, delivery,
//! configuration and service crates: fixed-size hashes and addresses,
//! signatures, transactions, receipts, the error taxonomy and the TOML
//! schema validator used by configuration loading.

pub mod account;
pub mod common;
pub mod delivery;
pub mod errors;
pub mod utils;
pub mod validation;

pub use account::*;
pub use common::*;
pub use delivery::*;
pub use errors::*;
pub use utils::*;
pub use validation::*;
