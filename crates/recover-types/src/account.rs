//! Account-related types.
//!
//! This module defines signatures, transactions and the transactor (the
//! signing context used to authorize state-changing calls).

use crate::common::Address;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use std::fmt;

/// Cryptographic signature representation.
///
/// Stores signatures as raw bytes in the standard Ethereum format (r, s, v)
/// where v is 27 or 28.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(&self.0))
	}
}

impl From<alloy::primitives::Signature> for Signature {
	fn from(sig: alloy::primitives::Signature) -> Self {
		let mut bytes = Vec::with_capacity(65);
		bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
		bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
		// ecrecover expects the pre-EIP-155 form: v = 27 + y_parity
		let v = if sig.v() { 28 } else { 27 };
		bytes.push(v);
		Signature(bytes)
	}
}

/// Transaction to submit or call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	/// Recipient address (None for contract creation).
	pub to: Option<Address>,
	/// Calldata, or creation bytecode when `to` is None.
	pub data: Vec<u8>,
	/// Value to transfer in native currency.
	pub value: U256,
}

impl Transaction {
	/// Contract creation with the given bytecode.
	pub fn deploy(code: impl Into<Vec<u8>>) -> Self {
		Self {
			to: None,
			data: code.into(),
			value: U256::ZERO,
		}
	}

	/// Call to `to` with the given calldata.
	pub fn call(to: Address, data: impl Into<Vec<u8>>) -> Self {
		Self {
			to: Some(to),
			data: data.into(),
			value: U256::ZERO,
		}
	}

	pub fn is_deployment(&self) -> bool {
		self.to.is_none()
	}
}

/// Conversion from our Transaction type to Alloy's TransactionRequest.
impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		let request = TransactionRequest::default().with_value(tx.value);
		match tx.to {
			Some(to) => request
				.with_to(alloy::primitives::Address::from(to))
				.with_input(Bytes::from(tx.data)),
			None => request.with_deploy_code(Bytes::from(tx.data)),
		}
	}
}

/// Signing context for state-changing calls.
///
/// Binds a signing key to a chain id and carries the value attached to
/// each submitted transaction.
#[derive(Clone)]
pub struct Transactor {
	signer: PrivateKeySigner,
	/// Chain the transactions are valid on.
	pub chain_id: u64,
	/// Value attached to submitted transactions.
	pub value: U256,
}

impl Transactor {
	/// Creates a transactor; the signer is rebound to `chain_id`.
	pub fn new(mut signer: PrivateKeySigner, chain_id: u64) -> Self {
		alloy::signers::Signer::set_chain_id(&mut signer, Some(chain_id));
		Self {
			signer,
			chain_id,
			value: U256::ZERO,
		}
	}

	/// Address transactions are sent from.
	pub fn from(&self) -> Address {
		self.signer.address().into()
	}

	/// Wallet for a provider's signing filler.
	pub fn wallet(&self) -> EthereumWallet {
		EthereumWallet::from(self.signer.clone())
	}
}

impl fmt::Debug for Transactor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Transactor")
			.field("from", &self.from())
			.field("chain_id", &self.chain_id)
			.field("value", &self.value)
			.finish()
	}
}
