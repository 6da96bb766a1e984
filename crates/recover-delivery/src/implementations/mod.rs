//! Delivery implementations.
//!
//! - `rpc`: HTTP JSON-RPC through an Alloy provider

pub mod rpc;
