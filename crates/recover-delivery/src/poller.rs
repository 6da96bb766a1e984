//! Transaction confirmation polling.
//!
//! The poller waits for a submitted transaction's receipt with a linear
//! backoff and classifies the outcome:
//!
//! ```text
//! Polling -> Confirmed (success)
//!         -> OutOfGas | ExecutionFailed (mined, status failed)
//!         -> NotMined (attempt budget exhausted)
//! ```
//!
//! Individual receipt queries are bounded by a short timeout. A query that
//! errors or times out counts as "no receipt yet".

use crate::{DeliveryError, DeliveryInterface};
use recover_types::{
	truncate_hash, PollAttempt, PollPolicy, TransactionHash, TransactionReceipt,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A transaction that was mined and executed successfully.
#[derive(Debug, Clone)]
pub struct Confirmation {
	pub receipt: TransactionReceipt,
	/// Every query made, the last one being the one that found the receipt.
	pub attempts: Vec<PollAttempt>,
}

/// Waits for transaction receipts through a `DeliveryInterface`.
pub struct ConfirmationPoller {
	delivery: Arc<dyn DeliveryInterface>,
	policy: PollPolicy,
}

impl ConfirmationPoller {
	pub fn new(delivery: Arc<dyn DeliveryInterface>, policy: PollPolicy) -> Self {
		Self { delivery, policy }
	}

	/// Polls until a receipt for `tx_hash` shows up or the budget runs out.
	///
	/// `name` labels the transaction in errors and logs. Returns as soon as
	/// a receipt is found; a failed receipt is reported as `OutOfGas` when
	/// its gas used equals the cumulative gas used, `ExecutionFailed`
	/// otherwise. The out-of-gas label is a heuristic.
	pub async fn check_tx(
		&self,
		tx_hash: &TransactionHash,
		name: &str,
	) -> Result<Confirmation, DeliveryError> {
		let short_hash = truncate_hash(&tx_hash.to_string());
		let mut attempts = Vec::with_capacity(self.policy.max_attempts as usize);
		let mut found = None;

		for index in 0..self.policy.max_attempts {
			let waited = self.policy.delay_before(index);
			tokio::time::sleep(waited).await;

			let receipt = self.query_receipt(tx_hash, &short_hash).await;
			let attempt = PollAttempt {
				index,
				waited,
				found: receipt.is_some(),
			};
			debug!(
				tx_hash = %short_hash,
				attempt = attempt.index,
				waited_secs = attempt.waited.as_secs_f64(),
				found = attempt.found,
				"Polled for receipt"
			);
			attempts.push(attempt);

			if receipt.is_some() {
				found = receipt;
				break;
			}
		}

		let Some(receipt) = found else {
			return Err(DeliveryError::NotMined {
				name: name.to_string(),
				tx_hash: *tx_hash,
				attempts: attempts.len() as u32,
			});
		};

		if !receipt.succeeded() {
			warn!(
				tx_hash = %short_hash,
				gas_used = receipt.gas_used,
				cumulative_gas_used = receipt.cumulative_gas_used,
				"{} transaction failed", name
			);
			return Err(if receipt.looks_out_of_gas() {
				DeliveryError::OutOfGas {
					name: name.to_string(),
					tx_hash: *tx_hash,
				}
			} else {
				DeliveryError::ExecutionFailed {
					name: name.to_string(),
					tx_hash: *tx_hash,
				}
			});
		}

		info!(
			tx_hash = %short_hash,
			block = ?receipt.block_number,
			attempts = attempts.len(),
			"{} confirmed", name
		);

		Ok(Confirmation { receipt, attempts })
	}

	async fn query_receipt(
		&self,
		tx_hash: &TransactionHash,
		short_hash: &str,
	) -> Option<TransactionReceipt> {
		match tokio::time::timeout(self.policy.query_timeout, self.delivery.get_receipt(tx_hash))
			.await
		{
			Ok(Ok(receipt)) => receipt,
			Ok(Err(e)) => {
				warn!(tx_hash = %short_hash, "Get transaction receipt: {}", e);
				None
			}
			Err(_) => {
				warn!(
					tx_hash = %short_hash,
					"Receipt query timed out after {}s",
					self.policy.query_timeout.as_secs()
				);
				None
			}
		}
	}
}
