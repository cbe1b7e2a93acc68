//! Local preflight of a signed order pair.
//!
//! Runs the checks the settlement contract performs, using digests rebuilt from
//! the raw EIP-712 type strings rather than the signer-side derivation.

use crate::encoding::{decode_owner_order, decode_recipient_order};
use crate::witness::witness_for;
use crate::VerificationError;
use alloy_primitives::{Address, B256, U256};
use transfer_account::Signature;
use transfer_config::Config;
use transfer_types::utils::{
	compute_domain_hash, compute_final_digest, hash_permit_with_witness,
	hash_recipient_order_detail,
};
use transfer_types::{OwnerOrder, RecipientOrder, SigningRole};

/// Facts established by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransfer {
	pub owner: Address,
	pub recipient: Address,
	pub nonce: U256,
	pub deadline: U256,
	/// Total requested across all transfer details.
	pub total_requested: U256,
}

/// Verifies order pairs against one signing domain.
#[derive(Debug, Clone)]
pub struct OrderVerifier {
	domain_hash: B256,
}

impl OrderVerifier {
	pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
		Self {
			domain_hash: compute_domain_hash(name, version, chain_id, &verifying_contract),
		}
	}

	pub fn from_config(config: &Config) -> Self {
		Self::new(
			&config.domain.name,
			&config.domain.version,
			config.network.chain_id,
			config.contracts.permit2,
		)
	}

	/// Checks both orders as of `now` (seconds).
	pub fn verify(
		&self,
		owner_order: &OwnerOrder,
		recipient_order: &RecipientOrder,
		now: u64,
	) -> Result<VerifiedTransfer, VerificationError> {
		let owner_detail = decode_owner_order(&owner_order.order)?;
		let recipient_detail = decode_recipient_order(&recipient_order.order)?;
		let permit = &owner_detail.permit;

		// Permit2 accepts a signature up to and including its deadline second.
		if permit.deadline < U256::from(now) {
			return Err(VerificationError::Expired {
				deadline: permit.deadline,
				now,
			});
		}

		if permit.permitted.len() != owner_detail.transferDetails.len() {
			return Err(VerificationError::LengthMismatch {
				permitted: permit.permitted.len(),
				details: owner_detail.transferDetails.len(),
			});
		}

		let mut total_requested = U256::ZERO;
		for (index, (allowed, detail)) in permit
			.permitted
			.iter()
			.zip(&owner_detail.transferDetails)
			.enumerate()
		{
			if detail.requestedAmount > allowed.amount {
				return Err(VerificationError::AmountExceedsPermitted {
					index,
					requested: detail.requestedAmount,
					permitted: allowed.amount,
				});
			}
			total_requested = total_requested.saturating_add(detail.requestedAmount);
		}

		// The witness is recomputed from the recipient order, never taken on trust.
		let witness = witness_for(recipient_detail.to);
		if witness != owner_detail.witness {
			return Err(VerificationError::WitnessMismatch {
				recipient: recipient_detail.to,
			});
		}

		let owner_digest =
			compute_final_digest(&self.domain_hash, &hash_permit_with_witness(permit, &witness));
		check_signer(
			SigningRole::Owner,
			&owner_order.signature,
			&owner_digest,
			owner_detail.owner,
		)?;

		if recipient_detail.id != permit.nonce {
			return Err(VerificationError::CorrelationMismatch {
				nonce: permit.nonce,
				id: recipient_detail.id,
			});
		}

		let recipient_digest = compute_final_digest(
			&self.domain_hash,
			&hash_recipient_order_detail(&recipient_detail),
		);
		check_signer(
			SigningRole::Recipient,
			&recipient_order.signature,
			&recipient_digest,
			recipient_detail.to,
		)?;

		tracing::debug!(
			owner = %owner_detail.owner,
			recipient = %recipient_detail.to,
			nonce = %permit.nonce,
			"Order pair verified"
		);

		Ok(VerifiedTransfer {
			owner: owner_detail.owner,
			recipient: recipient_detail.to,
			nonce: permit.nonce,
			deadline: permit.deadline,
			total_requested,
		})
	}
}

fn check_signer(
	role: SigningRole,
	signature: &[u8],
	digest: &B256,
	expected: Address,
) -> Result<(), VerificationError> {
	let signature =
		Signature::try_from(signature).map_err(|e| VerificationError::MalformedSignature {
			role,
			reason: e.to_string(),
		})?;
	let recovered = signature.recover_address_from_prehash(digest).map_err(|e| {
		VerificationError::MalformedSignature {
			role,
			reason: e.to_string(),
		}
	})?;
	if recovered != expected {
		return Err(VerificationError::InvalidSignature {
			role,
			expected,
			recovered,
		});
	}
	Ok(())
}
