//! Alloy-based settlement executor.
//!
//! Submits `execute(senderOrder, recipientOrder)` from the executor account over
//! HTTP JSON-RPC and polls for the receipt. Gas, nonce and chain id are filled
//! by the provider.

use crate::calldata::{classify_revert, classify_revert_data, encode_execute_call};
use crate::{DeliveryError, DeliveryInterface, RevertKind};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::{BlockNumberOrTag, BlockTransactionsKind, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use transfer_config::Config;
use transfer_types::{truncate_id, ExecutionReceipt, OwnerOrder, RecipientOrder, SecretString};

/// Seconds allowed per requested confirmation before giving up.
const SECONDS_PER_CONFIRMATION: u64 = 20;
/// Upper bound on the confirmation wait.
const MAX_WAIT_SECONDS: u64 = 3600;

/// Executor submitting to one settlement contract on one chain.
pub struct AlloyExecutor {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	settlement: Address,
	executor: Address,
	chain_id: u64,
	poll_interval: Duration,
}

impl AlloyExecutor {
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		settlement: Address,
		signer: PrivateKeySigner,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url.parse().map_err(|e| {
			DeliveryError::Configuration(format!("Invalid RPC URL {}: {}", rpc_url, e))
		})?;

		let signer = signer.with_chain_id(Some(chain_id));
		let executor = signer.address();
		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(EthereumWallet::from(signer))
			.on_http(url);

		let poll_interval = Duration::from_secs(2);
		provider.client().set_poll_interval(poll_interval);

		Ok(Self {
			provider: Arc::new(provider),
			settlement,
			executor,
			chain_id,
			poll_interval,
		})
	}
}

/// Seconds to wait for `confirmations`, at least one slot and at most the cap.
fn confirmation_timeout(confirmations: u64) -> u64 {
	confirmations
		.saturating_mul(SECONDS_PER_CONFIRMATION)
		.clamp(SECONDS_PER_CONFIRMATION, MAX_WAIT_SECONDS)
}

/// Confirmations of a transaction mined in `tx_block`, counting the inclusion block.
fn confirmations_at(tx_block: u64, current_block: u64) -> u64 {
	current_block.saturating_sub(tx_block).saturating_add(1)
}

/// Maps a failed submission to a revert kind when the node reports a revert.
fn submission_error(message: String, revert_data: Option<&[u8]>) -> DeliveryError {
	let reverted = revert_data.is_some() || message.to_ascii_lowercase().contains("revert");
	if !reverted {
		return DeliveryError::Network(format!("Failed to send transaction: {}", message));
	}

	let kind = match revert_data.map(classify_revert_data) {
		Some(kind) if kind != RevertKind::Other => kind,
		_ => classify_revert(&message),
	};
	DeliveryError::Reverted {
		kind,
		reason: message,
	}
}

#[async_trait]
impl DeliveryInterface for AlloyExecutor {
	fn executor_address(&self) -> Address {
		self.executor
	}

	async fn execute(
		&self,
		owner: &OwnerOrder,
		recipient: &RecipientOrder,
	) -> Result<B256, DeliveryError> {
		let request = TransactionRequest::default()
			.from(self.executor)
			.to(self.settlement)
			.input(encode_execute_call(owner, recipient).into());

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| {
				let revert_data = e.as_error_resp().and_then(|payload| payload.as_revert_data());
				submission_error(e.to_string(), revert_data.as_deref().map(|data| &**data))
			})?;

		let tx_hash = *pending.tx_hash();
		tracing::debug!(
			tx_hash = %truncate_id(&tx_hash.to_string()),
			chain_id = self.chain_id,
			settlement = %self.settlement,
			"Sent settlement transaction"
		);
		Ok(tx_hash)
	}

	async fn wait_for_confirmation(
		&self,
		tx_hash: &B256,
		confirmations: u64,
	) -> Result<ExecutionReceipt, DeliveryError> {
		let timeout_seconds = confirmation_timeout(confirmations);
		let max_wait_time = Duration::from_secs(timeout_seconds);
		let start_time = tokio::time::Instant::now();

		tracing::info!(
			"Waiting for {} confirmations (timeout: {}s)",
			confirmations,
			timeout_seconds
		);

		loop {
			if start_time.elapsed() > max_wait_time {
				return Err(DeliveryError::Network(format!(
					"Timeout waiting for {} confirmations after {} seconds",
					confirmations,
					max_wait_time.as_secs()
				)));
			}

			let receipt = match self.provider.get_transaction_receipt(*tx_hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					tokio::time::sleep(self.poll_interval).await;
					continue;
				},
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				},
			};

			let current_block = self.provider.get_block_number().await.map_err(|e| {
				DeliveryError::Network(format!("Failed to get block number: {}", e))
			})?;

			// Pending receipts carry no block number yet.
			let Some(tx_block) = receipt.block_number else {
				tokio::time::sleep(self.poll_interval).await;
				continue;
			};
			let current_confirmations = confirmations_at(tx_block, current_block);

			if current_confirmations >= confirmations {
				return Ok(ExecutionReceipt {
					tx_hash: receipt.transaction_hash,
					block_number: tx_block,
					success: receipt.status(),
				});
			}

			tracing::debug!(
				"Waiting for {} more confirmations...",
				confirmations.saturating_sub(current_confirmations)
			);
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn latest_block_timestamp(&self) -> Result<u64, DeliveryError> {
		let block = self
			.provider
			.get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get latest block: {}", e)))?
			.ok_or_else(|| DeliveryError::Network("Latest block not found".to_string()))?;

		Ok(block.header.timestamp)
	}
}

/// Factory function to create the executor from configuration.
///
/// Uses `accounts.executor` for gas, `network.rpc_url` and `contracts.settlement`.
pub fn create_executor(config: &Config) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	let signer = parse_signer(&config.accounts.executor.private_key)?;
	let executor = AlloyExecutor::new(
		&config.network.rpc_url,
		config.network.chain_id,
		config.contracts.settlement,
		signer,
	)?;
	Ok(Box::new(executor))
}

fn parse_signer(private_key: &SecretString) -> Result<PrivateKeySigner, DeliveryError> {
	private_key.with_exposed(|key| {
		key.trim().parse().map_err(|_| {
			DeliveryError::Configuration("Invalid executor private key format".to_string())
		})
	})
}
