//! Account provider implementations.
//!
//! - `local`: private key held in process memory

pub mod local;
