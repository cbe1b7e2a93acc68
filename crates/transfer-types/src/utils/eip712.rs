//! Hand-rolled EIP-712 hashing for the two transfer schemas.
//!
//! Signing goes through the `sol!`-derived `SolStruct` implementations. These
//! helpers rebuild the same digests from the raw type strings so that a
//! verifier can recompute what each party signed without trusting the
//! signer-side derivation:
//! - Domain hash computation (name, version, chainId, verifyingContract)
//! - Struct hashes for the owner and recipient primary types
//! - Final digest computation (0x1901 || domainHash || structHash)

use crate::order::{PermitBatchTransferFrom, RecipientOrderDetail, TokenPermissions};
use alloy_primitives::{keccak256, Address, B256, U256};

pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const TOKEN_PERMISSIONS_TYPE: &str = "TokenPermissions(address token,uint256 amount)";
pub const PERMIT_BATCH_WITNESS_TYPE: &str =
	"PermitBatchWitnessTransferFrom(TokenPermissions[] permitted,uint256 nonce,uint256 deadline,bytes32 witness)";
pub const RECIPIENT_ORDER_DETAIL_TYPE: &str =
	"RecipientOrderDetail(address to,uint256 amount,uint256 id)";

/// Type hash of the owner primary type, with its referenced `TokenPermissions` appended.
pub fn owner_type_hash() -> B256 {
	keccak256(format!("{}{}", PERMIT_BATCH_WITNESS_TYPE, TOKEN_PERMISSIONS_TYPE).as_bytes())
}

/// Type hash of the recipient primary type.
pub fn recipient_type_hash() -> B256 {
	keccak256(RECIPIENT_ORDER_DETAIL_TYPE.as_bytes())
}

/// Compute the EIP-712 domain hash.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_b256(&keccak256(name.as_bytes()));
	enc.push_b256(&keccak256(version.as_bytes()));
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Hash of a `TokenPermissions[]` member: keccak256 of the concatenated element struct hashes.
pub fn hash_token_permissions(permitted: &[TokenPermissions]) -> B256 {
	let type_hash = keccak256(TOKEN_PERMISSIONS_TYPE.as_bytes());
	let mut concatenated = Vec::with_capacity(permitted.len() * 32);
	for entry in permitted {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&type_hash);
		enc.push_address(&entry.token);
		enc.push_u256(entry.amount);
		concatenated.extend_from_slice(keccak256(enc.finish()).as_slice());
	}
	keccak256(concatenated)
}

/// Struct hash of `PermitBatchWitnessTransferFrom` built from a payload permit and a witness.
pub fn hash_permit_with_witness(permit: &PermitBatchTransferFrom, witness: &B256) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&owner_type_hash());
	enc.push_b256(&hash_token_permissions(&permit.permitted));
	enc.push_u256(permit.nonce);
	enc.push_u256(permit.deadline);
	enc.push_b256(witness);
	keccak256(enc.finish())
}

/// Struct hash of `RecipientOrderDetail`.
pub fn hash_recipient_order_detail(detail: &RecipientOrderDetail) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&recipient_type_hash());
	enc.push_address(&detail.to);
	enc.push_u256(detail.amount);
	enc.push_u256(detail.id);
	keccak256(enc.finish())
}

/// Word-aligned encoder for the static member values of an EIP-712 struct.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_sol_types::{eip712_domain, SolStruct};

	const PERMIT2: Address = address!("000000000022D473030F116dDEE9F6B43aC78BA3");
	const TOKEN: Address = address!("0FA8781a83E46826621b3BC094Ea2A0212e71B23");

	fn sample_permit() -> PermitBatchTransferFrom {
		PermitBatchTransferFrom {
			permitted: vec![
				TokenPermissions {
					token: TOKEN,
					amount: U256::from(1000),
				},
				TokenPermissions {
					token: TOKEN,
					amount: U256::from(2500),
				},
			],
			nonce: U256::from(42),
			deadline: U256::from(1_700_003_600u64),
		}
	}

	#[test]
	fn test_domain_hash_matches_sol_types() {
		let domain = eip712_domain! {
			name: "Permit2",
			version: "1",
			chain_id: 80001,
			verifying_contract: PERMIT2,
		};
		assert_eq!(
			compute_domain_hash("Permit2", "1", 80001, &PERMIT2),
			domain.hash_struct()
		);
	}

	#[test]
	fn test_owner_digest_matches_sol_types() {
		let permit = sample_permit();
		let witness = B256::repeat_byte(0x11);
		let typed = permit.with_witness(witness);

		assert_eq!(owner_type_hash(), typed.eip712_type_hash());
		assert_eq!(
			hash_permit_with_witness(&permit, &witness),
			typed.eip712_hash_struct()
		);

		let domain = eip712_domain! {
			name: "Permit2",
			version: "1",
			chain_id: 80001,
			verifying_contract: PERMIT2,
		};
		let manual = compute_final_digest(
			&compute_domain_hash("Permit2", "1", 80001, &PERMIT2),
			&hash_permit_with_witness(&permit, &witness),
		);
		assert_eq!(manual, typed.eip712_signing_hash(&domain));
	}

	#[test]
	fn test_recipient_digest_matches_sol_types() {
		let detail = RecipientOrderDetail {
			to: address!("696600D88559ac1C0E84de6208F3C568Af9e6a48"),
			amount: U256::from(1000),
			id: U256::from(42),
		};
		assert_eq!(recipient_type_hash(), detail.eip712_type_hash());
		assert_eq!(hash_recipient_order_detail(&detail), detail.eip712_hash_struct());
	}

	#[test]
	fn test_witness_changes_owner_struct_hash() {
		let permit = sample_permit();
		assert_ne!(
			hash_permit_with_witness(&permit, &B256::repeat_byte(0x01)),
			hash_permit_with_witness(&permit, &B256::repeat_byte(0x02))
		);
	}

	#[test]
	fn test_role_type_hashes_differ() {
		assert_ne!(owner_type_hash(), recipient_type_hash());
	}
}
