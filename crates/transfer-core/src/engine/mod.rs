//! Transfer engine that builds, checks and submits a signed order pair.
//!
//! One run derives a nonce, builds the owner's permit with the recipient
//! witness, has both parties sign concurrently, encodes the two payloads,
//! optionally re-runs the settlement checks locally and hands the pair to the
//! executor.

pub mod context;

use self::context::Clock;
use alloy_primitives::Bytes;
use alloy_sol_types::Eip712Domain;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use transfer_account::Signature;
use transfer_config::Config;
use transfer_delivery::{DeliveryError, DeliveryService};
use transfer_order::{
	decode_owner_order, decode_recipient_order, encode_owner_order, encode_recipient_order,
	sign_pair, witness_for, ConstructionError, EncodingError, NonceGenerator, OrderError,
	OrderVerifier, OwnerSigner, RecipientSigner, SigningError, TransferPlan, TypedDataSigner,
	VerificationError, VerifiedTransfer,
};
use transfer_types::{
	truncate_id, ExecutionReceipt, OwnerOrder, OwnerOrderDetail, RecipientOrder,
	RecipientOrderDetail, SignedOrderPair,
};

/// Errors that can occur during a transfer run.
#[derive(Debug, Error)]
pub enum TransferError {
	#[error(transparent)]
	Order(#[from] OrderError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
}

impl From<ConstructionError> for TransferError {
	fn from(err: ConstructionError) -> Self {
		TransferError::Order(err.into())
	}
}

impl From<SigningError> for TransferError {
	fn from(err: SigningError) -> Self {
		TransferError::Order(err.into())
	}
}

impl From<EncodingError> for TransferError {
	fn from(err: EncodingError) -> Self {
		TransferError::Order(err.into())
	}
}

impl From<VerificationError> for TransferError {
	fn from(err: VerificationError) -> Self {
		TransferError::Order(err.into())
	}
}

/// Both payloads decoded back into their typed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedOrders {
	pub owner: OwnerOrderDetail,
	pub recipient: RecipientOrderDetail,
}

impl DecodedOrders {
	pub fn from_pair(pair: &SignedOrderPair) -> Result<Self, EncodingError> {
		Ok(Self {
			owner: decode_owner_order(&pair.owner.order)?,
			recipient: decode_recipient_order(&pair.recipient.order)?,
		})
	}
}

/// Everything a run produced, printable as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
	pub pair: SignedOrderPair,
	pub decoded: DecodedOrders,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub receipt: Option<ExecutionReceipt>,
}

/// Builds and submits dual-authorization transfers for one configuration.
pub struct TransferEngine {
	config: Config,
	plan: TransferPlan,
	domain: Eip712Domain,
	owner: OwnerSigner,
	recipient: RecipientSigner,
	nonces: NonceGenerator,
	verifier: OrderVerifier,
	clock: Clock,
	delivery: Arc<DeliveryService>,
}

impl TransferEngine {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		config: Config,
		plan: TransferPlan,
		domain: Eip712Domain,
		owner: OwnerSigner,
		recipient: RecipientSigner,
		nonces: NonceGenerator,
		verifier: OrderVerifier,
		delivery: Arc<DeliveryService>,
	) -> Self {
		let clock = Clock::new(config.order.time_source, delivery.clone());
		Self {
			config,
			plan,
			domain,
			owner,
			recipient,
			nonces,
			verifier,
			clock,
			delivery,
		}
	}

	pub fn plan(&self) -> &TransferPlan {
		&self.plan
	}

	/// Builds a signed pair using the configured time source.
	pub async fn build_signed_pair(&self) -> Result<SignedOrderPair, TransferError> {
		let now = self.clock.now().await?;
		self.build_signed_pair_at(now).await
	}

	/// Builds a signed pair as of `now` (seconds).
	pub async fn build_signed_pair_at(&self, now: u64) -> Result<SignedOrderPair, TransferError> {
		let owner = self.owner.address();
		let nonce = self.nonces.next(owner, now);
		let permit = self
			.plan
			.permit_builder(self.config.order.ttl_seconds)
			.build(nonce, now)?;
		let witness = witness_for(self.plan.recipient());
		let detail = self.plan.recipient_detail(nonce);

		let (owner_signature, recipient_signature) = sign_pair(
			&self.owner,
			&self.recipient,
			&self.domain,
			&permit.with_witness(witness),
			&detail,
		)
		.await?;

		let deadline = permit.deadline;
		let owner_detail = OwnerOrderDetail {
			permit,
			transferDetails: self.plan.transfer_details().to_vec(),
			owner,
			witness,
		};

		tracing::info!(
			nonce = %truncate_id(&format!("{:x}", nonce)),
			deadline = %deadline,
			owner = %owner,
			recipient = %detail.to,
			legs = owner_detail.transferDetails.len(),
			"Built signed order pair"
		);

		Ok(SignedOrderPair {
			nonce,
			deadline,
			owner: OwnerOrder {
				order: encode_owner_order(&owner_detail),
				signature: signature_bytes(&owner_signature),
			},
			recipient: RecipientOrder {
				order: encode_recipient_order(&detail),
				signature: signature_bytes(&recipient_signature),
			},
		})
	}

	/// Runs the settlement checks locally against the current time.
	pub async fn preflight(&self, pair: &SignedOrderPair) -> Result<VerifiedTransfer, TransferError> {
		let now = self.clock.now().await?;
		let verified = self.verifier.verify(&pair.owner, &pair.recipient, now)?;
		tracing::debug!(nonce = %truncate_id(&format!("{:x}", pair.nonce)), "Preflight passed");
		Ok(verified)
	}

	/// Submits the pair, running the preflight first when enabled.
	pub async fn submit(&self, pair: &SignedOrderPair) -> Result<ExecutionReceipt, TransferError> {
		if self.config.execution.preflight {
			self.preflight(pair).await?;
		}
		Ok(self.delivery.deliver(pair).await?)
	}

	/// Builds a pair and, unless `dry_run`, submits it.
	pub async fn run(&self, dry_run: bool) -> Result<TransferReport, TransferError> {
		let pair = self.build_signed_pair().await?;
		let decoded = DecodedOrders::from_pair(&pair)?;

		let receipt = if dry_run {
			if self.config.execution.preflight {
				self.preflight(&pair).await?;
			}
			tracing::info!("Dry run, not submitting");
			None
		} else {
			Some(self.submit(&pair).await?)
		};

		Ok(TransferReport {
			pair,
			decoded,
			receipt,
		})
	}
}

fn signature_bytes(signature: &Signature) -> Bytes {
	Bytes::from(signature.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TransferBuilder;
	use alloy_primitives::{B256, U256};
	use transfer_account::implementations::local::create_account;
	use transfer_config::builders::config::{DEV_EXECUTOR, DEV_RECIPIENT};
	use transfer_config::{ConfigBuilder, NonceStrategy, TimeSource};
	use transfer_delivery::{DeliveryInterface, MockDeliveryInterface, RevertKind};
	use transfer_order::derive_nonce;

	const NOW: u64 = 1_700_000_000;

	fn engine(config: Config, mut executor: MockDeliveryInterface) -> TransferEngine {
		executor.expect_executor_address().return_const(DEV_EXECUTOR);
		let executor = std::sync::Mutex::new(Some(executor));
		TransferBuilder::new(config)
			.build(create_account, move |_| {
				let executor = executor
					.lock()
					.unwrap()
					.take()
					.expect("executor created once");
				Ok(Box::new(executor) as Box<dyn DeliveryInterface>)
			})
			.unwrap()
	}

	#[tokio::test]
	async fn test_built_pair_decodes_and_correlates() {
		let config = ConfigBuilder::new().build();
		let engine = engine(config, MockDeliveryInterface::new());

		let pair = engine.build_signed_pair_at(NOW).await.unwrap();
		let decoded = DecodedOrders::from_pair(&pair).unwrap();

		assert_eq!(pair.deadline, U256::from(NOW + 3600));
		assert_eq!(decoded.owner.permit.nonce, pair.nonce);
		assert_eq!(decoded.recipient.id, pair.nonce);
		assert_eq!(decoded.owner.permit.permitted.len(), 2);
		assert_eq!(decoded.owner.transferDetails[0].to, DEV_RECIPIENT);
		assert_eq!(decoded.owner.transferDetails[1].to, DEV_EXECUTOR);
		assert_eq!(decoded.owner.witness, witness_for(DEV_RECIPIENT));
		assert_eq!(decoded.recipient.to, DEV_RECIPIENT);
		assert_eq!(decoded.recipient.amount, U256::from(1000));
		assert_eq!(pair.owner.signature.len(), 65);
		assert_eq!(pair.recipient.signature.len(), 65);
	}

	#[tokio::test]
	async fn test_built_pair_passes_local_verification() {
		let config = ConfigBuilder::new().build();
		let verifier = OrderVerifier::from_config(&config);
		let engine = engine(config, MockDeliveryInterface::new());

		let pair = engine.build_signed_pair_at(NOW).await.unwrap();
		let verified = verifier.verify(&pair.owner, &pair.recipient, NOW).unwrap();
		assert_eq!(verified.nonce, pair.nonce);
		assert_eq!(verified.recipient, DEV_RECIPIENT);
	}

	#[tokio::test]
	async fn test_block_time_drives_nonce_and_deadline() {
		let config = ConfigBuilder::new()
			.time_source(TimeSource::Block)
			.nonce_strategy(NonceStrategy::Timestamp)
			.build();
		let settlement = config.contracts.settlement;

		let mut executor = MockDeliveryInterface::new();
		executor
			.expect_latest_block_timestamp()
			.times(1)
			.returning(|| Ok(NOW));
		let engine = engine(config, executor);

		let pair = engine.build_signed_pair().await.unwrap();
		let owner = DecodedOrders::from_pair(&pair).unwrap().owner.owner;
		assert_eq!(pair.nonce, derive_nonce(settlement, owner, U256::from(NOW)));
		assert_eq!(pair.deadline, U256::from(NOW + 3600));
	}

	#[tokio::test]
	async fn test_consecutive_pairs_use_distinct_nonces() {
		let engine = engine(ConfigBuilder::new().build(), MockDeliveryInterface::new());

		let first = engine.build_signed_pair_at(NOW).await.unwrap();
		let second = engine.build_signed_pair_at(NOW).await.unwrap();
		assert_ne!(first.nonce, second.nonce);
	}

	#[tokio::test]
	async fn test_submit_runs_preflight_then_delivers() {
		let config = ConfigBuilder::new().build();
		let tx_hash = B256::repeat_byte(0x42);

		let mut executor = MockDeliveryInterface::new();
		executor
			.expect_execute()
			.times(1)
			.returning(move |_, _| Ok(tx_hash));
		executor
			.expect_wait_for_confirmation()
			.times(1)
			.returning(move |_, _| {
				Ok(ExecutionReceipt {
					tx_hash,
					block_number: 7,
					success: true,
				})
			});
		let engine = engine(config, executor);

		let report = engine.run(false).await.unwrap();
		let receipt = report.receipt.unwrap();
		assert_eq!(receipt.tx_hash, tx_hash);
		assert_eq!(report.decoded.recipient.id, report.pair.nonce);
	}

	#[tokio::test]
	async fn test_expired_pair_is_not_submitted() {
		let config = ConfigBuilder::new().ttl_seconds(60).build();
		let mut executor = MockDeliveryInterface::new();
		executor.expect_execute().never();
		let engine = engine(config, executor);

		let pair = engine.build_signed_pair_at(NOW).await.unwrap();
		let result = engine.submit(&pair).await;
		assert!(matches!(
			result,
			Err(TransferError::Order(OrderError::Verification(
				VerificationError::Expired { .. }
			)))
		));
	}

	#[tokio::test]
	async fn test_revert_is_surfaced_without_preflight() {
		let config = ConfigBuilder::new().preflight(false).build();
		let mut executor = MockDeliveryInterface::new();
		executor.expect_execute().times(1).returning(|_, _| {
			Err(DeliveryError::Reverted {
				kind: RevertKind::NonceConsumed,
				reason: "InvalidNonce()".to_string(),
			})
		});
		let engine = engine(config, executor);

		let pair = engine.build_signed_pair_at(NOW).await.unwrap();
		let result = engine.submit(&pair).await;
		assert!(matches!(
			result,
			Err(TransferError::Delivery(DeliveryError::Reverted {
				kind: RevertKind::NonceConsumed,
				..
			}))
		));
	}

	#[tokio::test]
	async fn test_dry_run_report_serializes() {
		let mut executor = MockDeliveryInterface::new();
		executor.expect_execute().never();
		let engine = engine(ConfigBuilder::new().build(), executor);

		let report = engine.run(true).await.unwrap();
		assert!(report.receipt.is_none());

		let json = serde_json::to_value(&report).unwrap();
		assert!(json.get("receipt").is_none());
		assert!(json["decoded"]["owner"]["permit"]["permitted"].is_array());
		assert!(json["pair"]["owner"]["signature"].is_string());
	}
}
