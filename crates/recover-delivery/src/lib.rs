//! RPC collaborator for the recover check.
//!
//! `DeliveryInterface` is the small capability surface the check needs from
//! a node: chain id, transaction submission, receipt lookup and read-only
//! calls. `AlloyDelivery` implements it over HTTP JSON-RPC, and
//! `ConfirmationPoller` waits for a submitted transaction's receipt.

use async_trait::async_trait;
use recover_types::{CheckError, Transaction, TransactionHash, TransactionReceipt, Transactor};
use thiserror::Error;

pub mod implementations;
pub mod poller;

pub use implementations::rpc::AlloyDelivery;
pub use poller::{Confirmation, ConfirmationPoller};
pub use recover_types::PollPolicy;

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Connection error: {0}")]
	Connection(String),
	#[error("Submission failed: {0}")]
	Submission(String),
	#[error("Receipt query failed: {0}")]
	Receipt(String),
	#[error("Call failed: {0}")]
	Call(String),
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
	#[error("{name} {tx_hash}: transaction mined but execution failed")]
	ExecutionFailed {
		name: String,
		tx_hash: TransactionHash,
	},
}

impl From<DeliveryError> for CheckError {
	fn from(err: DeliveryError) -> Self {
		match err {
			DeliveryError::Connection(msg) => CheckError::Connection(msg),
			DeliveryError::Submission(msg) | DeliveryError::Call(msg) => {
				CheckError::Submission(msg)
			}
			// Only reachable outside the poller, which swallows query errors
			DeliveryError::Receipt(msg) => CheckError::Connection(msg),
			DeliveryError::NotMined {
				name,
				tx_hash,
				attempts,
			} => CheckError::NotMined {
				name,
				tx_hash,
				attempts,
			},
			DeliveryError::OutOfGas { name, tx_hash } => CheckError::OutOfGas { name, tx_hash },
			DeliveryError::ExecutionFailed { name, tx_hash } => {
				CheckError::ExecutionFailed { name, tx_hash }
			}
		}
	}
}

/// Node capabilities used by the check.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Chain id reported by the node.
	async fn chain_id(&self) -> Result<u64, DeliveryError>;

	/// Signs `tx` with the transactor and submits it. A transaction without
	/// a recipient deploys its data as contract creation code.
	async fn submit(
		&self,
		tx: Transaction,
		transactor: &Transactor,
	) -> Result<TransactionHash, DeliveryError>;

	/// Receipt for `hash`, or None while the transaction is not yet mined.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;

	/// Read-only call; returns the raw return data.
	async fn call(&self, tx: Transaction) -> Result<Vec<u8>, DeliveryError>;
}
