//! Signature recovery check against a live chain.
//!
//! Signs the digest of an access message, deploys the `Recover` contract,
//! waits for the deployment to be mined, then asks the contract to recover
//! the signer from the digest and signature.
//!
//! # Components
//!
//! - `check`: the sequential check flow
//! - `cli`: command-line arguments
//! - `contract`: `Recover` ABI and creation bytecode

pub mod check;
pub mod cli;
pub mod contract;

pub use check::{CheckReport, RecoverCheck};
