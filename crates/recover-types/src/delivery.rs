//! Transaction delivery types.
//!
//! This module defines the receipt observed after a transaction is included
//! in a block, the receipt polling schedule, and the record of a single
//! receipt poll.

use crate::common::{Address, Bytes32, TransactionHash};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a
/// block. Serialized with the same camelCase keys node RPCs use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub transaction_hash: TransactionHash,
	/// Hash of the including block.
	pub block_hash: Option<Bytes32>,
	/// The block number where the transaction was included.
	pub block_number: Option<u64>,
	/// Position of the transaction in the block.
	pub transaction_index: Option<u64>,
	/// Whether the transaction executed successfully.
	pub status: bool,
	/// Gas used by this transaction alone.
	pub gas_used: u64,
	/// Gas used in the block up to and including this transaction.
	pub cumulative_gas_used: u64,
	/// Price paid per unit of gas, in wei.
	pub effective_gas_price: u128,
	/// Sender.
	pub from: Address,
	/// Recipient, None for contract creation.
	pub to: Option<Address>,
	/// Address of the created contract, if any.
	pub contract_address: Option<Address>,
}

impl TransactionReceipt {
	pub fn succeeded(&self) -> bool {
		self.status
	}

	/// Heuristic for a failed receipt: the failing transaction consumed all
	/// of the block gas counted so far. Not a guaranteed out-of-gas signal
	/// on every chain.
	pub fn looks_out_of_gas(&self) -> bool {
		!self.status && self.gas_used == self.cumulative_gas_used
	}
}

/// One receipt query made while waiting for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
	/// Zero-based attempt index.
	pub index: u32,
	/// Wait that preceded the query.
	pub waited: Duration,
	/// Whether the node returned a receipt.
	pub found: bool,
}

/// Retry schedule for receipt polling.
///
/// Attempt 0 waits `initial_delay`; attempt `i > 0` waits `i * step_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
	pub max_attempts: u32,
	/// One block interval plus margin.
	pub initial_delay: Duration,
	/// Nominal block interval.
	pub step_delay: Duration,
	/// Bound on each receipt query.
	pub query_timeout: Duration,
}

impl Default for PollPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 10,
			initial_delay: Duration::from_secs(6),
			step_delay: Duration::from_secs(5),
			query_timeout: Duration::from_secs(3),
		}
	}
}

impl PollPolicy {
	/// Wait before the given zero-based attempt.
	pub fn delay_before(&self, attempt: u32) -> Duration {
		if attempt == 0 {
			self.initial_delay
		} else {
			self.step_delay * attempt
		}
	}

	/// Sum of all waits if every attempt comes back empty, excluding query time.
	pub fn total_wait(&self) -> Duration {
		(0..self.max_attempts).map(|i| self.delay_before(i)).sum()
	}
}
