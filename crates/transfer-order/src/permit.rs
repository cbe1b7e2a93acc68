//! Permit and transfer plan construction.

use crate::ConstructionError;
use alloy_primitives::{Address, U256};
use transfer_config::TransferConfig;
use transfer_types::{
	parse_token_amount, PermitBatchTransferFrom, RecipientOrderDetail, SignatureTransferDetails,
	TokenPermissions,
};

/// Builds a batch permit with `deadline = now + ttl`.
#[derive(Debug, Clone, Default)]
pub struct PermitBuilder {
	permitted: Vec<TokenPermissions>,
	ttl_seconds: u64,
}

impl PermitBuilder {
	pub fn new(ttl_seconds: u64) -> Self {
		Self {
			permitted: Vec::new(),
			ttl_seconds,
		}
	}

	/// Adds one (token, amount) entry.
	pub fn permit(mut self, token: Address, amount: U256) -> Self {
		self.permitted.push(TokenPermissions { token, amount });
		self
	}

	/// Adds one entry whose amount is given as a base-10 string.
	pub fn permit_decimal(self, token: Address, amount: &str) -> Result<Self, ConstructionError> {
		let amount = parse_token_amount(amount).map_err(ConstructionError::InvalidAmount)?;
		Ok(self.permit(token, amount))
	}

	pub fn build(self, nonce: U256, now: u64) -> Result<PermitBatchTransferFrom, ConstructionError> {
		if self.permitted.is_empty() {
			return Err(ConstructionError::EmptyPermitted);
		}
		if self.ttl_seconds == 0 {
			return Err(ConstructionError::NonPositiveTtl);
		}
		let deadline = now
			.checked_add(self.ttl_seconds)
			.ok_or(ConstructionError::DeadlineOverflow {
				now,
				ttl: self.ttl_seconds,
			})?;

		Ok(PermitBatchTransferFrom {
			permitted: self.permitted,
			nonce,
			deadline: U256::from(deadline),
		})
	}
}

/// The permitted entries and the index-aligned transfers drawn against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
	recipient: Address,
	permitted: Vec<TokenPermissions>,
	transfer_details: Vec<SignatureTransferDetails>,
	recipient_amount: U256,
}

impl TransferPlan {
	/// Checks alignment and totals the amount paid to `recipient`.
	pub fn new(
		recipient: Address,
		permitted: Vec<TokenPermissions>,
		transfer_details: Vec<SignatureTransferDetails>,
	) -> Result<Self, ConstructionError> {
		if permitted.is_empty() {
			return Err(ConstructionError::EmptyPermitted);
		}
		if permitted.len() != transfer_details.len() {
			return Err(ConstructionError::LengthMismatch {
				permitted: permitted.len(),
				details: transfer_details.len(),
			});
		}

		let mut recipient_amount: Option<U256> = None;
		for detail in transfer_details.iter().filter(|d| d.to == recipient) {
			let total = recipient_amount
				.unwrap_or(U256::ZERO)
				.checked_add(detail.requestedAmount)
				.ok_or_else(|| {
					ConstructionError::InvalidAmount(format!(
						"amount paid to {} overflows uint256",
						recipient
					))
				})?;
			recipient_amount = Some(total);
		}
		let recipient_amount =
			recipient_amount.ok_or(ConstructionError::MissingRecipientLeg(recipient))?;

		Ok(Self {
			recipient,
			permitted,
			transfer_details,
			recipient_amount,
		})
	}

	/// One permitted entry and one transfer detail per configured leg, all in `token`.
	pub fn from_config(transfer: &TransferConfig, token: Address) -> Result<Self, ConstructionError> {
		let mut permitted = Vec::with_capacity(transfer.legs.len());
		let mut transfer_details = Vec::with_capacity(transfer.legs.len());

		for leg in &transfer.legs {
			let requested =
				parse_token_amount(&leg.amount).map_err(ConstructionError::InvalidAmount)?;
			let allowed = match &leg.permitted_amount {
				Some(value) => parse_token_amount(value).map_err(ConstructionError::InvalidAmount)?,
				None => requested,
			};
			permitted.push(TokenPermissions {
				token,
				amount: allowed,
			});
			transfer_details.push(SignatureTransferDetails {
				to: leg.to,
				requestedAmount: requested,
			});
		}

		Self::new(transfer.recipient, permitted, transfer_details)
	}

	pub fn recipient(&self) -> Address {
		self.recipient
	}

	pub fn permitted(&self) -> &[TokenPermissions] {
		&self.permitted
	}

	pub fn transfer_details(&self) -> &[SignatureTransferDetails] {
		&self.transfer_details
	}

	/// Sum of the requested amounts paid to the recipient.
	pub fn recipient_amount(&self) -> U256 {
		self.recipient_amount
	}

	/// A permit builder preloaded with this plan's permitted entries.
	pub fn permit_builder(&self, ttl_seconds: u64) -> PermitBuilder {
		self.permitted
			.iter()
			.fold(PermitBuilder::new(ttl_seconds), |builder, entry| {
				builder.permit(entry.token, entry.amount)
			})
	}

	/// The recipient's order detail, correlated to the permit by `nonce`.
	pub fn recipient_detail(&self, nonce: U256) -> RecipientOrderDetail {
		RecipientOrderDetail {
			to: self.recipient,
			amount: self.recipient_amount,
			id: nonce,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use transfer_config::TransferLeg;

	const TOKEN: Address = address!("0FA8781a83E46826621b3BC094Ea2A0212e71B23");
	const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
	const EXECUTOR: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

	fn leg(to: Address, amount: &str) -> TransferLeg {
		TransferLeg {
			to,
			amount: amount.to_string(),
			permitted_amount: None,
		}
	}

	#[test]
	fn test_build_permit_sets_deadline() {
		let permit = PermitBuilder::new(3600)
			.permit(TOKEN, U256::from(1000))
			.permit_decimal(TOKEN, "2000")
			.unwrap()
			.build(U256::from(9), 1_700_000_000)
			.unwrap();

		assert_eq!(permit.permitted.len(), 2);
		assert_eq!(permit.permitted[1].amount, U256::from(2000));
		assert_eq!(permit.nonce, U256::from(9));
		assert_eq!(permit.deadline, U256::from(1_700_003_600u64));
	}

	#[test]
	fn test_build_permit_rejects_empty_entries() {
		let result = PermitBuilder::new(3600).build(U256::ZERO, 0);
		assert!(matches!(result, Err(ConstructionError::EmptyPermitted)));
	}

	#[test]
	fn test_build_permit_rejects_zero_ttl() {
		let result = PermitBuilder::new(0)
			.permit(TOKEN, U256::from(1))
			.build(U256::ZERO, 0);
		assert!(matches!(result, Err(ConstructionError::NonPositiveTtl)));
	}

	#[test]
	fn test_build_permit_rejects_deadline_overflow() {
		let result = PermitBuilder::new(10)
			.permit(TOKEN, U256::from(1))
			.build(U256::ZERO, u64::MAX - 5);
		assert!(matches!(
			result,
			Err(ConstructionError::DeadlineOverflow { ttl: 10, .. })
		));
	}

	#[test]
	fn test_permit_decimal_rejects_bad_amount() {
		let result = PermitBuilder::new(10).permit_decimal(TOKEN, "-1");
		assert!(matches!(result, Err(ConstructionError::InvalidAmount(_))));
	}

	#[test]
	fn test_plan_from_config_two_legs() {
		let transfer = TransferConfig {
			recipient: RECIPIENT,
			legs: vec![leg(RECIPIENT, "1000"), leg(EXECUTOR, "1000")],
		};

		let plan = TransferPlan::from_config(&transfer, TOKEN).unwrap();
		assert_eq!(plan.permitted().len(), 2);
		assert_eq!(plan.transfer_details()[0].to, RECIPIENT);
		assert_eq!(plan.transfer_details()[1].to, EXECUTOR);
		assert_eq!(plan.recipient_amount(), U256::from(1000));

		let detail = plan.recipient_detail(U256::from(77));
		assert_eq!(detail.to, RECIPIENT);
		assert_eq!(detail.amount, U256::from(1000));
		assert_eq!(detail.id, U256::from(77));
	}

	#[test]
	fn test_plan_sums_multiple_recipient_legs() {
		let transfer = TransferConfig {
			recipient: RECIPIENT,
			legs: vec![leg(RECIPIENT, "1000"), leg(RECIPIENT, "250")],
		};
		let plan = TransferPlan::from_config(&transfer, TOKEN).unwrap();
		assert_eq!(plan.recipient_amount(), U256::from(1250));
	}

	#[test]
	fn test_plan_uses_permitted_amount_override() {
		let mut first = leg(RECIPIENT, "1000");
		first.permitted_amount = Some("5000".to_string());
		let transfer = TransferConfig {
			recipient: RECIPIENT,
			legs: vec![first],
		};

		let plan = TransferPlan::from_config(&transfer, TOKEN).unwrap();
		assert_eq!(plan.permitted()[0].amount, U256::from(5000));
		assert_eq!(plan.transfer_details()[0].requestedAmount, U256::from(1000));
	}

	#[test]
	fn test_plan_rejects_missing_recipient_leg() {
		let transfer = TransferConfig {
			recipient: RECIPIENT,
			legs: vec![leg(EXECUTOR, "1000")],
		};
		let result = TransferPlan::from_config(&transfer, TOKEN);
		assert!(matches!(
			result,
			Err(ConstructionError::MissingRecipientLeg(addr)) if addr == RECIPIENT
		));
	}

	#[test]
	fn test_plan_rejects_length_mismatch() {
		let result = TransferPlan::new(
			RECIPIENT,
			vec![TokenPermissions {
				token: TOKEN,
				amount: U256::from(1),
			}],
			vec![],
		);
		assert!(matches!(
			result,
			Err(ConstructionError::LengthMismatch {
				permitted: 1,
				details: 0
			})
		));
	}

	#[test]
	fn test_permit_builder_from_plan() {
		let transfer = TransferConfig {
			recipient: RECIPIENT,
			legs: vec![leg(RECIPIENT, "1000"), leg(EXECUTOR, "1000")],
		};
		let plan = TransferPlan::from_config(&transfer, TOKEN).unwrap();
		let permit = plan
			.permit_builder(60)
			.build(U256::from(1), 100)
			.unwrap();
		assert_eq!(permit.permitted, plan.permitted());
		assert_eq!(permit.deadline, U256::from(160));
	}
}
