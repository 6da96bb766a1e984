//! Error taxonomy for the recover check.

use crate::common::{Address, TransactionHash};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckError>;

/// Every failure the check can end with.
///
/// Crate-local errors (account, delivery, config) convert into this type.
#[derive(Error, Debug)]
pub enum CheckError {
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Signing error: {0}")]
	Signing(String),

	#[error("Submission error: {0}")]
	Submission(String),

	#[error("{name} {tx_hash}: no receipt after {attempts} attempts, transaction not mined")]
	NotMined {
		name: String,
		tx_hash: TransactionHash,
		attempts: u32,
	},

	#[error("{name} {tx_hash}: transaction likely exceeded its gas limit")]
	OutOfGas {
		name: String,
		tx_hash: TransactionHash,
	},

	#[error("{name} {tx_hash}: transaction mined but execution failed, check the transaction input")]
	ExecutionFailed {
		name: String,
		tx_hash: TransactionHash,
	},

	#[error("Decode error: {0}")]
	Decode(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Recovered address {recovered} does not match signer {expected}")]
	RecoveryMismatch {
		expected: Address,
		recovered: Address,
	},
}

impl From<serde_json::Error> for CheckError {
	fn from(err: serde_json::Error) -> Self {
		CheckError::Decode(err.to_string())
	}
}
