//! Order schemas for the dual-authorization transfer.
//!
//! The Solidity structs below serve two purposes. `PermitBatchWitnessTransferFrom`
//! and `RecipientOrderDetail` are the EIP-712 primary types signed by the owner and
//! the recipient respectively. `PermitBatchTransferFrom`, `SignatureTransferDetails`,
//! `OwnerOrderDetail` and `RecipientOrderDetail` describe the ABI layout of the two
//! payloads decoded by the settlement contract.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};
use std::fmt;

sol! {
	/// A single (token, amount) entry of a batch permit.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct TokenPermissions {
		address token;
		uint256 amount;
	}

	/// The owner's batch permit as carried in the owner order payload.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct PermitBatchTransferFrom {
		TokenPermissions[] permitted;
		uint256 nonce;
		uint256 deadline;
	}

	/// The owner-role signing schema: the batch permit extended with the
	/// recipient witness hash as a signed field.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct PermitBatchWitnessTransferFrom {
		TokenPermissions[] permitted;
		uint256 nonce;
		uint256 deadline;
		bytes32 witness;
	}

	/// Destination and amount drawn against the permitted entry at the same index.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct SignatureTransferDetails {
		address to;
		uint256 requestedAmount;
	}

	/// The recipient-role signing schema, also the recipient payload layout.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct RecipientOrderDetail {
		address to;
		uint256 amount;
		uint256 id;
	}

	/// Parameter layout of the owner order payload.
	#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
	struct OwnerOrderDetail {
		PermitBatchTransferFrom permit;
		SignatureTransferDetails[] transferDetails;
		address owner;
		bytes32 witness;
	}
}

impl PermitBatchTransferFrom {
	/// Extends the permit with a witness hash, producing the owner signing schema.
	pub fn with_witness(&self, witness: B256) -> PermitBatchWitnessTransferFrom {
		PermitBatchWitnessTransferFrom {
			permitted: self.permitted.clone(),
			nonce: self.nonce,
			deadline: self.deadline,
			witness,
		}
	}
}

/// Witness data committed into the owner's signature.
///
/// Only `keccak256(abi.encodePacked(recipient))` is ever transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
	pub recipient: Address,
}

/// The two signing roles of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningRole {
	/// Token owner signing the batch permit.
	Owner,
	/// Recipient counter-signing the order detail.
	Recipient,
}

impl fmt::Display for SigningRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SigningRole::Owner => write!(f, "owner"),
			SigningRole::Recipient => write!(f, "recipient"),
		}
	}
}

/// Owner-side order: ABI payload plus the owner's EIP-712 signature.
///
/// The signature covers the typed permit (with witness), not the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerOrder {
	pub order: Bytes,
	pub signature: Bytes,
}

/// Recipient-side order: ABI payload plus the recipient's EIP-712 signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientOrder {
	pub order: Bytes,
	pub signature: Bytes,
}

/// A fully built, signed order pair ready for the settlement contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrderPair {
	/// Correlation value shared by both orders.
	pub nonce: U256,
	/// Absolute expiry of the owner permit in seconds.
	pub deadline: U256,
	pub owner: OwnerOrder,
	pub recipient: RecipientOrder,
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_sol_types::SolStruct;

	#[test]
	fn test_with_witness_keeps_permit_fields() {
		let permit = PermitBatchTransferFrom {
			permitted: vec![TokenPermissions {
				token: address!("0FA8781a83E46826621b3BC094Ea2A0212e71B23"),
				amount: U256::from(1000),
			}],
			nonce: U256::from(7),
			deadline: U256::from(1_700_000_000u64),
		};
		let witness = B256::repeat_byte(0xab);

		let extended = permit.with_witness(witness);
		assert_eq!(extended.permitted, permit.permitted);
		assert_eq!(extended.nonce, permit.nonce);
		assert_eq!(extended.deadline, permit.deadline);
		assert_eq!(extended.witness, witness);
	}

	#[test]
	fn test_signing_schemas_are_distinct() {
		assert_eq!(
			PermitBatchWitnessTransferFrom::NAME,
			"PermitBatchWitnessTransferFrom"
		);
		assert_eq!(RecipientOrderDetail::NAME, "RecipientOrderDetail");
		assert_ne!(
			PermitBatchWitnessTransferFrom::eip712_encode_type(),
			RecipientOrderDetail::eip712_encode_type()
		);
	}

	#[test]
	fn test_signing_role_display() {
		assert_eq!(SigningRole::Owner.to_string(), "owner");
		assert_eq!(SigningRole::Recipient.to_string(), "recipient");
	}
}
