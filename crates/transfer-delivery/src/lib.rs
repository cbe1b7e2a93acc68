//! Settlement submission module for the transfer system.
//!
//! This module hands a signed order pair to the settlement contract and reports
//! the outcome. Submission is abstracted behind [`DeliveryInterface`] so that
//! order construction can be exercised without a chain; failures are reported as
//! distinct [`RevertKind`]s instead of a generic error.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transfer_types::{truncate_id, ExecutionReceipt, OwnerOrder, RecipientOrder, SignedOrderPair};

pub mod calldata;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use calldata::{classify_revert, classify_revert_data, encode_execute_call};

/// Why the settlement contract rejected an order pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertKind {
	/// The permit deadline has passed.
	ExpiredDeadline,
	/// The nonce was already consumed.
	NonceConsumed,
	/// A signature does not recover to the expected party.
	InvalidSignature,
	/// The owner's witness does not bind the submitted recipient.
	WitnessMismatch,
	/// A requested amount exceeds its permitted amount.
	AmountExceedsPermitted,
	/// The recipient order id differs from the permit nonce.
	CorrelationMismatch,
	/// Permitted entries and transfer details differ in length.
	LengthMismatch,
	/// Any other revert.
	Other,
}

impl std::fmt::Display for RevertKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			RevertKind::ExpiredDeadline => "expired deadline",
			RevertKind::NonceConsumed => "nonce already consumed",
			RevertKind::InvalidSignature => "invalid signature",
			RevertKind::WitnessMismatch => "witness mismatch",
			RevertKind::AmountExceedsPermitted => "amount exceeds permitted",
			RevertKind::CorrelationMismatch => "correlation mismatch",
			RevertKind::LengthMismatch => "length mismatch",
			RevertKind::Other => "other",
		};
		f.write_str(name)
	}
}

/// Errors that can occur during settlement submission.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The settlement contract rejected the order pair.
	#[error("Settlement reverted ({kind}): {reason}")]
	Reverted { kind: RevertKind, reason: String },
	/// Error that occurs when the executor cannot be set up.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for settlement executors.
///
/// An executor owns the account that pays for the settlement transaction.
/// It never signs either order.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Address of the account submitting the transaction.
	fn executor_address(&self) -> Address;

	/// Submits `execute(senderOrder, recipientOrder)` and returns the transaction hash.
	async fn execute(
		&self,
		owner: &OwnerOrder,
		recipient: &RecipientOrder,
	) -> Result<B256, DeliveryError>;

	/// Waits until the transaction has the given number of confirmations.
	async fn wait_for_confirmation(
		&self,
		tx_hash: &B256,
		confirmations: u64,
	) -> Result<ExecutionReceipt, DeliveryError>;

	/// Timestamp of the latest block, used as the nonce time and the preflight clock.
	async fn latest_block_timestamp(&self) -> Result<u64, DeliveryError>;
}

/// Service that submits order pairs through one executor.
pub struct DeliveryService {
	implementation: Box<dyn DeliveryInterface>,
	confirmations: u64,
}

impl DeliveryService {
	pub fn new(implementation: Box<dyn DeliveryInterface>, confirmations: u64) -> Self {
		Self {
			implementation,
			confirmations,
		}
	}

	pub fn executor_address(&self) -> Address {
		self.implementation.executor_address()
	}

	/// Submits the pair and waits for it to be mined.
	///
	/// A mined but failed transaction is reported as [`DeliveryError::Reverted`].
	pub async fn deliver(&self, pair: &SignedOrderPair) -> Result<ExecutionReceipt, DeliveryError> {
		let tx_hash = self
			.implementation
			.execute(&pair.owner, &pair.recipient)
			.await?;
		tracing::info!(
			tx_hash = %truncate_id(&tx_hash.to_string()),
			nonce = %pair.nonce,
			"Submitted settlement"
		);

		let receipt = self
			.implementation
			.wait_for_confirmation(&tx_hash, self.confirmations)
			.await?;
		if !receipt.success {
			return Err(DeliveryError::Reverted {
				kind: RevertKind::Other,
				reason: format!(
					"transaction {} failed in block {}",
					receipt.tx_hash, receipt.block_number
				),
			});
		}

		tracing::info!(
			tx_hash = %truncate_id(&tx_hash.to_string()),
			block = receipt.block_number,
			"Settlement confirmed"
		);
		Ok(receipt)
	}

	pub async fn latest_block_timestamp(&self) -> Result<u64, DeliveryError> {
		self.implementation.latest_block_timestamp().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, U256};

	fn pair() -> SignedOrderPair {
		SignedOrderPair {
			nonce: U256::from(1),
			deadline: U256::from(2),
			owner: OwnerOrder {
				order: Bytes::from(vec![1u8; 32]),
				signature: Bytes::from(vec![2u8; 65]),
			},
			recipient: RecipientOrder {
				order: Bytes::from(vec![3u8; 96]),
				signature: Bytes::from(vec![4u8; 65]),
			},
		}
	}

	#[tokio::test]
	async fn test_deliver_returns_confirmed_receipt() {
		let tx_hash = B256::repeat_byte(0xaa);
		let mut executor = MockDeliveryInterface::new();
		executor
			.expect_execute()
			.withf(|owner, recipient| owner.order.len() == 32 && recipient.order.len() == 96)
			.times(1)
			.returning(move |_, _| Ok(tx_hash));
		executor
			.expect_wait_for_confirmation()
			.withf(move |hash, confirmations| *hash == tx_hash && *confirmations == 3)
			.times(1)
			.returning(move |_, _| {
				Ok(ExecutionReceipt {
					tx_hash,
					block_number: 10,
					success: true,
				})
			});

		let service = DeliveryService::new(Box::new(executor), 3);
		let receipt = service.deliver(&pair()).await.unwrap();
		assert_eq!(receipt.tx_hash, tx_hash);
		assert_eq!(receipt.block_number, 10);
	}

	#[tokio::test]
	async fn test_deliver_reports_failed_receipt_as_revert() {
		let mut executor = MockDeliveryInterface::new();
		executor
			.expect_execute()
			.returning(|_, _| Ok(B256::repeat_byte(0xbb)));
		executor.expect_wait_for_confirmation().returning(|hash, _| {
			Ok(ExecutionReceipt {
				tx_hash: *hash,
				block_number: 11,
				success: false,
			})
		});

		let service = DeliveryService::new(Box::new(executor), 1);
		let result = service.deliver(&pair()).await;
		assert!(matches!(
			result,
			Err(DeliveryError::Reverted {
				kind: RevertKind::Other,
				..
			})
		));
	}

	#[tokio::test]
	async fn test_deliver_propagates_submission_revert() {
		let mut executor = MockDeliveryInterface::new();
		executor.expect_execute().returning(|_, _| {
			Err(DeliveryError::Reverted {
				kind: RevertKind::NonceConsumed,
				reason: "InvalidNonce()".to_string(),
			})
		});
		executor.expect_wait_for_confirmation().never();

		let service = DeliveryService::new(Box::new(executor), 1);
		let result = service.deliver(&pair()).await;
		assert!(matches!(
			result,
			Err(DeliveryError::Reverted {
				kind: RevertKind::NonceConsumed,
				..
			})
		));
	}

	#[test]
	fn test_revert_kind_display() {
		assert_eq!(RevertKind::ExpiredDeadline.to_string(), "expired deadline");
		assert_eq!(RevertKind::Other.to_string(), "other");
	}
}
