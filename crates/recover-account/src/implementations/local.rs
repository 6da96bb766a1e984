//! Local wallet backed by Alloy's private key signer.

use crate::{AccountError, AccountInterface};
use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use recover_types::{Address, Bytes32, Signature, Transactor};

/// Local wallet implementation using Alloy's signer.
///
/// This implementation keeps a private key in memory and uses it to sign
/// digests and to authorize transactions. It is meant for development
/// chains and manual checks.
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a new LocalWallet from a hex-encoded private key.
	///
	/// The key may be given with or without a 0x prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let key = private_key_hex.trim();
		let key = key.strip_prefix("0x").unwrap_or(key);

		let signer = key
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		tracing::debug!(address = %signer.address(), "Loaded local wallet");

		Ok(Self { signer })
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address().into())
	}

	async fn sign_hash(&self, hash: &Bytes32) -> Result<Signature, AccountError> {
		let signature = self
			.signer
			.sign_hash(&B256::from(*hash))
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign hash: {}", e)))?;

		Ok(signature.into())
	}

	fn transactor(&self, chain_id: u64) -> Transactor {
		Transactor::new(self.signer.clone(), chain_id)
	}
}

/// Recovers the address that produced `signature` over `hash`.
///
/// Accepts 65-byte `r || s || v` signatures with v in {0, 1, 27, 28}.
pub fn recover_signer(hash: &Bytes32, signature: &Signature) -> Result<Address, AccountError> {
	let parsed = alloy::primitives::Signature::from_raw(signature.as_bytes())
		.map_err(|e| AccountError::InvalidSignature(e.to_string()))?;

	let address = parsed
		.recover_address_from_prehash(&B256::from(*hash))
		.map_err(|e| AccountError::InvalidSignature(e.to_string()))?;

	Ok(address.into())
}
