//! Signing collaborator for the recover check.
//!
//! Provides the `AccountInterface` trait, a local private-key
//! implementation, off-chain signer recovery, and the digest of the demo
//! message that gets signed.

use async_trait::async_trait;
use recover_types::{Address, Bytes32, CheckError, Signature, Transactor};
use thiserror::Error;

pub mod digest;
pub mod implementations;

pub use digest::access_digest;
pub use implementations::local::{recover_signer, LocalWallet};

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
}

impl From<AccountError> for CheckError {
	fn from(err: AccountError) -> Self {
		CheckError::Signing(err.to_string())
	}
}

#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address derived from the signing key.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs a 32-byte digest as-is, without a message prefix.
	async fn sign_hash(&self, hash: &Bytes32) -> Result<Signature, AccountError>;

	/// Signing context for transactions on `chain_id`.
	fn transactor(&self, chain_id: u64) -> Transactor;
}
