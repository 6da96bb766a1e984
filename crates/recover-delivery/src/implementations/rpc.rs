//! HTTP JSON-RPC delivery using the Alloy library.

use crate::{DeliveryError, DeliveryInterface};
use alloy::network::TransactionBuilder;
use alloy::primitives::B256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt as RpcReceipt, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use recover_types::{
	truncate_hash, Transaction, TransactionHash, TransactionReceipt, Transactor,
};
use tracing::{debug, info};

/// Alloy-based delivery implementation.
///
/// Holds a read-only provider for queries. Submissions build a short-lived
/// wallet-backed provider from the transactor, so nonce, gas and fee fields
/// are filled by Alloy's recommended fillers and the request is signed
/// locally before `eth_sendRawTransaction`.
pub struct AlloyDelivery {
	url: Url,
	provider: DynProvider,
}

impl AlloyDelivery {
	/// Creates a delivery client for `rpc_url`.
	///
	/// Only the URL is checked here; the endpoint is first contacted by the
	/// next query.
	pub fn new(rpc_url: &str) -> Result<Self, DeliveryError> {
		let url: Url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Connection(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().connect_http(url.clone()).erased();

		Ok(Self { url, provider })
	}
}

/// Converts an RPC receipt into the workspace receipt type.
pub(crate) fn convert_receipt(receipt: RpcReceipt) -> TransactionReceipt {
	TransactionReceipt {
		transaction_hash: receipt.transaction_hash.into(),
		block_hash: receipt.block_hash.map(Into::into),
		block_number: receipt.block_number,
		transaction_index: receipt.transaction_index,
		status: receipt.status(),
		gas_used: receipt.gas_used,
		cumulative_gas_used: receipt.inner.cumulative_gas_used(),
		effective_gas_price: receipt.effective_gas_price,
		from: receipt.from.into(),
		to: receipt.to.map(Into::into),
		contract_address: receipt.contract_address.map(Into::into),
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		let chain_id = self.provider.get_chain_id().await.map_err(|e| {
			DeliveryError::Connection(format!("Failed to query chain id from {}: {}", self.url, e))
		})?;

		debug!(chain_id, url = %self.url, "Queried chain id");
		Ok(chain_id)
	}

	async fn submit(
		&self,
		tx: Transaction,
		transactor: &Transactor,
	) -> Result<TransactionHash, DeliveryError> {
		let provider = ProviderBuilder::new()
			.wallet(transactor.wallet())
			.connect_http(self.url.clone());

		let deployment = tx.is_deployment();
		let mut request: TransactionRequest = tx.into();
		request.set_from(transactor.from().into());
		request.set_chain_id(transactor.chain_id);
		request.set_value(transactor.value);

		let pending = provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Submission(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = TransactionHash::from(*pending.tx_hash());
		info!(
			tx_hash = %truncate_hash(&tx_hash.to_string()),
			deployment,
			"Submitted transaction"
		);

		Ok(tx_hash)
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let receipt = self
			.provider
			.get_transaction_receipt(B256::from(*hash))
			.await
			.map_err(|e| DeliveryError::Receipt(format!("Failed to get receipt: {}", e)))?;

		Ok(receipt.map(convert_receipt))
	}

	async fn call(&self, tx: Transaction) -> Result<Vec<u8>, DeliveryError> {
		let request: TransactionRequest = tx.into();

		let output = self
			.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Call(format!("eth_call failed: {}", e)))?;

		Ok(output.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn receipt_json(status: &str, gas_used: &str, cumulative: &str) -> String {
		format!(
			r#"{{
				"type": "0x2",
				"status": "{status}",
				"cumulativeGasUsed": "{cumulative}",
				"logs": [],
				"logsBloom": "0x{bloom}",
				"transactionHash": "0x{hash}",
				"transactionIndex": "0x1",
				"blockHash": "0x{block}",
				"blockNumber": "0x10",
				"gasUsed": "{gas_used}",
				"effectiveGasPrice": "0x3b9aca00",
				"from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
				"to": null,
				"contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3"
			}}"#,
			bloom = "00".repeat(256),
			hash = "ab".repeat(32),
			block = "cd".repeat(32),
		)
	}

	#[test]
	fn test_invalid_url_is_connection_error() {
		assert!(matches!(
			AlloyDelivery::new("not a url"),
			Err(DeliveryError::Connection(_))
		));
	}

	#[tokio::test]
	async fn test_unreachable_endpoint_is_connection_error() {
		// Nothing listens on port 1
		let delivery = AlloyDelivery::new("http://127.0.0.1:1").unwrap();

		match delivery.chain_id().await {
			Err(DeliveryError::Connection(msg)) => assert!(msg.contains("127.0.0.1:1")),
			other => panic!("expected connection error, got {:?}", other),
		}
	}

	#[test]
	fn test_convert_deployment_receipt() {
		let rpc: RpcReceipt =
			serde_json::from_str(&receipt_json("0x1", "0x1d4c0", "0x2bf20")).unwrap();
		let receipt = convert_receipt(rpc);

		assert!(receipt.status);
		assert_eq!(receipt.gas_used, 120_000);
		assert_eq!(receipt.cumulative_gas_used, 180_000);
		assert_eq!(receipt.block_number, Some(16));
		assert_eq!(receipt.transaction_index, Some(1));
		assert_eq!(receipt.effective_gas_price, 1_000_000_000);
		assert_eq!(receipt.to, None);
		assert_eq!(
			receipt.contract_address.map(|a| a.to_string()),
			Some("0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string())
		);
		assert_eq!(receipt.transaction_hash, TransactionHash([0xab; 32]));
	}

	#[test]
	fn test_convert_failed_receipt() {
		let rpc: RpcReceipt =
			serde_json::from_str(&receipt_json("0x0", "0x5208", "0x5208")).unwrap();
		let receipt = convert_receipt(rpc);

		assert!(!receipt.status);
		assert!(receipt.looks_out_of_gas());
	}
}
