//! Recipient witness.
//!
//! The owner's signature covers `keccak256(abi.encodePacked(address recipient))`,
//! which binds the permit to one recipient without carrying the recipient in the
//! permit itself.

use alloy_primitives::{keccak256, Address, B256};
use transfer_types::Witness;

/// Hashes the witness over the 20 packed address bytes.
pub fn hash_witness(witness: &Witness) -> B256 {
	keccak256(witness.recipient.as_slice())
}

/// Shorthand for hashing a witness binding `recipient`.
pub fn witness_for(recipient: Address) -> B256 {
	hash_witness(&Witness { recipient })
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_witness_hash_is_packed_address_hash() {
		let recipient = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
		let expected = keccak256(hex::decode("70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap());
		assert_eq!(hash_witness(&Witness { recipient }), expected);
	}

	#[test]
	fn test_witness_differs_per_recipient() {
		let a = witness_for(address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"));
		let b = witness_for(address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"));
		assert_ne!(a, b);
	}
}
