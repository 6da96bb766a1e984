//! The recover check flow.
//!
//! One sequential pass: query the chain id, sign the message digest, deploy
//! `Recover`, wait for the deployment receipt, call `recover` and compare
//! the result with the signer. Diagnostic values are printed to stdout as
//! they become available; the first error ends the run.

use crate::contract;
use alloy::primitives::U256;
use recover_account::{access_digest, AccountInterface};
use recover_config::RecoverConfig;
use recover_delivery::{ConfirmationPoller, DeliveryInterface};
use recover_types::{
	truncate_hash, Address, Bytes32, CheckError, PollAttempt, Signature, Transaction,
	TransactionHash, TransactionReceipt,
};
use std::sync::Arc;
use tracing::info;

/// Label used for the deployment in poller errors.
pub const DEPLOY_LABEL: &str = "deploy Recover";

/// Everything a successful check observed.
#[derive(Debug, Clone)]
pub struct CheckReport {
	pub chain_id: u64,
	pub digest: Bytes32,
	pub signature: Signature,
	pub signer: Address,
	pub deploy_tx: TransactionHash,
	pub contract: Address,
	pub receipt: TransactionReceipt,
	pub attempts: Vec<PollAttempt>,
	pub recovered: Address,
}

pub struct RecoverCheck {
	config: RecoverConfig,
	delivery: Arc<dyn DeliveryInterface>,
	/// Pays for and signs the deployment.
	transactor_account: Arc<dyn AccountInterface>,
	/// Signs the message digest.
	message_signer: Arc<dyn AccountInterface>,
}

impl RecoverCheck {
	pub fn new(
		config: RecoverConfig,
		delivery: Arc<dyn DeliveryInterface>,
		transactor_account: Arc<dyn AccountInterface>,
		message_signer: Arc<dyn AccountInterface>,
	) -> Self {
		Self {
			config,
			delivery,
			transactor_account,
			message_signer,
		}
	}

	/// Digest of the configured access message.
	pub fn digest(&self) -> Bytes32 {
		let message = &self.config.message;
		access_digest(
			&message.access,
			&message.access,
			U256::from(message.amount),
			message.allowed,
		)
	}

	pub async fn run(&self) -> Result<CheckReport, CheckError> {
		let chain_id = self.delivery.chain_id().await?;
		info!(chain_id, url = %self.config.network.rpc_url, "Connected to node");
		let transactor = self.transactor_account.transactor(chain_id);

		let digest = self.digest();
		println!("hash: {:?}", digest.as_bytes());
		println!("hex-hash: {}", hex::encode(digest.as_bytes()));

		let signature = self.message_signer.sign_hash(&digest).await?;
		let signer = self.message_signer.address().await?;
		println!("sign: {:?}", signature.as_bytes());
		println!("hex-sign: {}", hex::encode(signature.as_bytes()));
		println!();

		let deploy_tx = self
			.delivery
			.submit(Transaction::deploy(contract::creation_code()), &transactor)
			.await?;
		println!("deployTx: {}", deploy_tx);

		let poller = ConfirmationPoller::new(self.delivery.clone(), self.config.poll.policy());
		let confirmation = poller.check_tx(&deploy_tx, DEPLOY_LABEL).await?;
		let receipt = confirmation.receipt;

		let contract = receipt.contract_address.ok_or_else(|| {
			CheckError::Decode(format!(
				"{} {}: receipt has no contract address",
				DEPLOY_LABEL, deploy_tx
			))
		})?;
		println!("recoverAddr: {}", contract);
		println!("{}", serde_json::to_string_pretty(&receipt)?);
		println!("gasUsed: {}", receipt.gas_used);

		let output = self
			.delivery
			.call(Transaction::call(
				contract,
				contract::encode_recover(&digest, &signature),
			))
			.await?;
		let recovered = contract::decode_address(&output)?;
		println!("addr: {}", recovered);

		if recovered != signer {
			return Err(CheckError::RecoveryMismatch {
				expected: signer,
				recovered,
			});
		}

		info!(
			contract = %contract,
			tx_hash = %truncate_hash(&deploy_tx.to_string()),
			signer = %signer,
			"Recovered signer matches"
		);

		Ok(CheckReport {
			chain_id,
			digest,
			signature,
			signer,
			deploy_tx,
			contract,
			receipt,
			attempts: confirmation.attempts,
			recovered,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::node_bindings::{Anvil, AnvilInstance};
	use async_trait::async_trait;
	use recover_account::{recover_signer, AccountError, LocalWallet};
	use recover_config::{NetworkConfig, PollConfig, RecoverConfig};
	use recover_delivery::{AlloyDelivery, DeliveryError};
	use recover_types::{Bytes32, Transactor};
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Mutex;

	const TX_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const MESSAGE_KEY: &str = "0a95533a110ee10bdaa902fed92e56f3f7709a532e22b5974c03c0251648a5d4";
	const CONTRACT: Address = Address([0x5f; 20]);

	enum CallMode {
		/// Recover the signer from the calldata, like the deployed contract.
		Emulate,
		/// Return a fixed address word.
		Fixed(Address),
	}

	/// In-memory node: one deployment, mined on the first poll.
	struct FakeNode {
		reachable: bool,
		deploy_status: bool,
		call_mode: CallMode,
		submissions: AtomicU32,
		submitted: Mutex<Vec<(Transaction, u64)>>,
	}

	impl FakeNode {
		fn new() -> Self {
			Self {
				reachable: true,
				deploy_status: true,
				call_mode: CallMode::Emulate,
				submissions: AtomicU32::new(0),
				submitted: Mutex::new(Vec::new()),
			}
		}
	}

	fn address_word(address: &Address) -> Vec<u8> {
		let mut word = vec![0u8; 12];
		word.extend_from_slice(address.as_bytes());
		word
	}

	#[async_trait]
	impl DeliveryInterface for FakeNode {
		async fn chain_id(&self) -> Result<u64, DeliveryError> {
			if self.reachable {
				Ok(31337)
			} else {
				Err(DeliveryError::Connection("connection refused".to_string()))
			}
		}

		async fn submit(
			&self,
			tx: Transaction,
			transactor: &Transactor,
		) -> Result<TransactionHash, DeliveryError> {
			self.submissions.fetch_add(1, Ordering::SeqCst);
			self.submitted
				.lock()
				.unwrap()
				.push((tx, transactor.chain_id));
			Ok(TransactionHash([0xee; 32]))
		}

		async fn get_receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, DeliveryError> {
			Ok(Some(TransactionReceipt {
				transaction_hash: *hash,
				block_hash: Some(Bytes32([1; 32])),
				block_number: Some(3),
				transaction_index: Some(0),
				status: self.deploy_status,
				gas_used: 90_000,
				cumulative_gas_used: 90_000,
				effective_gas_price: 1_000_000_000,
				from: Address([0xf3; 20]),
				to: None,
				contract_address: Some(CONTRACT),
			}))
		}

		async fn call(&self, tx: Transaction) -> Result<Vec<u8>, DeliveryError> {
			assert_eq!(tx.to, Some(CONTRACT));
			match &self.call_mode {
				CallMode::Fixed(address) => Ok(address_word(address)),
				CallMode::Emulate => {
					let data = &tx.data;
					let hash = Bytes32::from_slice(&data[4..36]).unwrap();
					let signature = Signature(data[100..165].to_vec());
					let signer = recover_signer(&hash, &signature)
						.map_err(|e| DeliveryError::Call(e.to_string()))?;
					Ok(address_word(&signer))
				}
			}
		}
	}

	/// Wraps a wallet and counts signatures.
	struct CountingAccount {
		inner: LocalWallet,
		signatures: AtomicU32,
	}

	impl CountingAccount {
		fn new(key: &str) -> Arc<Self> {
			Arc::new(Self {
				inner: LocalWallet::new(key).unwrap(),
				signatures: AtomicU32::new(0),
			})
		}
	}

	#[async_trait]
	impl AccountInterface for CountingAccount {
		async fn address(&self) -> Result<Address, AccountError> {
			self.inner.address().await
		}

		async fn sign_hash(&self, hash: &Bytes32) -> Result<Signature, AccountError> {
			self.signatures.fetch_add(1, Ordering::SeqCst);
			self.inner.sign_hash(hash).await
		}

		fn transactor(&self, chain_id: u64) -> Transactor {
			self.inner.transactor(chain_id)
		}
	}

	fn config() -> RecoverConfig {
		RecoverConfig {
			network: NetworkConfig {
				rpc_url: "http://127.0.0.1:8545".to_string(),
				private_key: TX_KEY.to_string(),
				signer_key: Some(MESSAGE_KEY.to_string()),
			},
			..Default::default()
		}
	}

	fn check(node: Arc<FakeNode>, signer: Arc<CountingAccount>) -> RecoverCheck {
		RecoverCheck::new(
			config(),
			node,
			Arc::new(LocalWallet::new(TX_KEY).unwrap()),
			signer,
		)
	}

	#[tokio::test(start_paused = true)]
	async fn test_full_check_recovers_signer() {
		let node = Arc::new(FakeNode::new());
		let signer = CountingAccount::new(MESSAGE_KEY);
		let expected = signer.address().await.unwrap();

		let report = check(node.clone(), signer.clone()).run().await.unwrap();

		assert_eq!(report.chain_id, 31337);
		assert_eq!(report.signer, expected);
		assert_eq!(report.recovered, expected);
		assert_eq!(report.contract, CONTRACT);
		assert_eq!(report.deploy_tx, TransactionHash([0xee; 32]));
		assert_eq!(report.attempts.len(), 1);
		assert_eq!(signer.signatures.load(Ordering::SeqCst), 1);

		let submitted = node.submitted.lock().unwrap();
		assert_eq!(submitted.len(), 1);
		let (tx, chain_id) = &submitted[0];
		assert!(tx.is_deployment());
		assert_eq!(tx.data, contract::creation_code());
		assert_eq!(*chain_id, 31337);
	}

	#[tokio::test(start_paused = true)]
	async fn test_unreachable_node_stops_before_signing() {
		let node = Arc::new(FakeNode {
			reachable: false,
			..FakeNode::new()
		});
		let signer = CountingAccount::new(MESSAGE_KEY);

		let err = check(node.clone(), signer.clone()).run().await.unwrap_err();

		assert!(matches!(err, CheckError::Connection(_)));
		assert_eq!(signer.signatures.load(Ordering::SeqCst), 0);
		assert_eq!(node.submissions.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_failed_deployment_is_reported() {
		let node = Arc::new(FakeNode {
			deploy_status: false,
			..FakeNode::new()
		});

		let err = check(node, CountingAccount::new(MESSAGE_KEY))
			.run()
			.await
			.unwrap_err();

		match err {
			CheckError::OutOfGas { name, tx_hash } => {
				assert_eq!(name, DEPLOY_LABEL);
				assert_eq!(tx_hash, TransactionHash([0xee; 32]));
			}
			other => panic!("expected OutOfGas, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_wrong_recovered_address_is_mismatch() {
		let node = Arc::new(FakeNode {
			call_mode: CallMode::Fixed(Address([0x01; 20])),
			..FakeNode::new()
		});

		let err = check(node, CountingAccount::new(MESSAGE_KEY))
			.run()
			.await
			.unwrap_err();

		match err {
			CheckError::RecoveryMismatch { recovered, .. } => {
				assert_eq!(recovered, Address([0x01; 20]))
			}
			other => panic!("expected RecoveryMismatch, got {:?}", other),
		}
	}

	#[test]
	fn test_digest_follows_message_config() {
		let node = Arc::new(FakeNode::new());
		let mut cfg = config();
		let first = RecoverCheck::new(
			cfg.clone(),
			node.clone(),
			CountingAccount::new(TX_KEY),
			CountingAccount::new(MESSAGE_KEY),
		)
		.digest();

		cfg.message.amount = 2;
		let second = RecoverCheck::new(
			cfg,
			node,
			CountingAccount::new(TX_KEY),
			CountingAccount::new(MESSAGE_KEY),
		)
		.digest();

		assert_ne!(first, second);
	}

	/// Starts a local anvil node, or returns `None` when anvil is not installed.
	fn spawn_anvil() -> Option<AnvilInstance> {
		match Anvil::new().try_spawn() {
			Ok(anvil) => Some(anvil),
			Err(e) => {
				eprintln!("anvil not available, skipping: {}", e);
				None
			}
		}
	}

	#[tokio::test]
	async fn test_deployed_contract_recovers_signer_on_anvil() {
		let Some(anvil) = spawn_anvil() else {
			return;
		};

		let mut cfg = config();
		cfg.network.rpc_url = anvil.endpoint();
		cfg.poll = PollConfig {
			max_attempts: 5,
			initial_delay_secs: 0,
			step_delay_secs: 1,
			query_timeout_secs: 3,
		};
		let delivery = Arc::new(AlloyDelivery::new(&cfg.network.rpc_url).unwrap());
		let signer = CountingAccount::new(MESSAGE_KEY);
		let expected = signer.address().await.unwrap();

		let report = RecoverCheck::new(
			cfg,
			delivery.clone(),
			Arc::new(LocalWallet::new(TX_KEY).unwrap()),
			signer,
		)
		.run()
		.await
		.unwrap();

		assert_eq!(report.chain_id, anvil.chain_id());
		assert!(report.receipt.status);
		assert_eq!(report.recovered, expected);

		// v given as 0/1 is lifted to 27/28 by the contract
		let mut raw_v = report.signature.clone();
		raw_v.0[64] -= 27;
		let output = delivery
			.call(Transaction::call(
				report.contract,
				contract::encode_recover(&report.digest, &raw_v),
			))
			.await
			.unwrap();
		assert_eq!(contract::decode_address(&output).unwrap(), expected);

		let output = delivery
			.call(Transaction::call(
				report.contract,
				contract::encode_recover(&Bytes32([7; 32]), &report.signature),
			))
			.await
			.unwrap();
		assert_ne!(contract::decode_address(&output).unwrap(), expected);
	}
}
