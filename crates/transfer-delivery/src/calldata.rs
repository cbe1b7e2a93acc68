//! Settlement contract call encoding and revert classification.

use crate::RevertKind;
use alloy_primitives::Bytes;
use alloy_sol_types::{sol, Revert, SolCall, SolError};
use transfer_types::{OwnerOrder, RecipientOrder};

sol! {
	/// The settlement contract entry point.
	interface IDomainBasedTransferExecutor {
		struct SenderOrder {
			bytes order;
			bytes signature;
		}

		struct RecipientOrder {
			bytes order;
			bytes signature;
		}

		function execute(SenderOrder senderOrder, RecipientOrder recipientOrder) external;
	}

	/// Errors raised by the Permit2 signature-transfer path.
	interface IPermit2Errors {
		error SignatureExpired(uint256 signatureDeadline);
		error InvalidNonce();
		error InvalidSigner();
		error InvalidSignature();
		error InvalidSignatureLength();
		error InvalidContractSignature();
		error InvalidAmount(uint256 maxAmount);
		error LengthMismatch();
	}
}

/// Calldata for `execute(senderOrder, recipientOrder)`.
pub fn encode_execute_call(owner: &OwnerOrder, recipient: &RecipientOrder) -> Bytes {
	IDomainBasedTransferExecutor::executeCall {
		senderOrder: IDomainBasedTransferExecutor::SenderOrder {
			order: owner.order.clone(),
			signature: owner.signature.clone(),
		},
		recipientOrder: IDomainBasedTransferExecutor::RecipientOrder {
			order: recipient.order.clone(),
			signature: recipient.signature.clone(),
		},
	}
	.abi_encode()
	.into()
}

fn kind_from_selector(selector: [u8; 4]) -> Option<RevertKind> {
	use self::IPermit2Errors as E;

	let kind = match selector {
		s if s == E::SignatureExpired::SELECTOR => RevertKind::ExpiredDeadline,
		s if s == E::InvalidNonce::SELECTOR => RevertKind::NonceConsumed,
		s if s == E::InvalidSigner::SELECTOR
			|| s == E::InvalidSignature::SELECTOR
			|| s == E::InvalidSignatureLength::SELECTOR
			|| s == E::InvalidContractSignature::SELECTOR =>
		{
			RevertKind::InvalidSignature
		},
		s if s == E::InvalidAmount::SELECTOR => RevertKind::AmountExceedsPermitted,
		s if s == E::LengthMismatch::SELECTOR => RevertKind::LengthMismatch,
		_ => return None,
	};
	Some(kind)
}

/// Classifies raw revert data: a known custom error selector or an `Error(string)` reason.
pub fn classify_revert_data(data: &[u8]) -> RevertKind {
	if data.len() < 4 {
		return RevertKind::Other;
	}
	let mut selector = [0u8; 4];
	selector.copy_from_slice(&data[..4]);
	if let Some(kind) = kind_from_selector(selector) {
		return kind;
	}
	match Revert::abi_decode(data, true) {
		Ok(revert) => classify_revert(&revert.reason),
		Err(_) => RevertKind::Other,
	}
}

/// Classifies a revert from its textual reason.
///
/// Selectors embedded as `0x`-prefixed hex are matched first, then well-known
/// error names and reason phrases.
pub fn classify_revert(reason: &str) -> RevertKind {
	for (index, _) in reason.match_indices("0x") {
		let Some(hex) = reason.get(index + 2..index + 10) else {
			continue;
		};
		let Ok(value) = u32::from_str_radix(hex, 16) else {
			continue;
		};
		if let Some(kind) = kind_from_selector(value.to_be_bytes()) {
			return kind;
		}
	}

	let lower = reason.to_ascii_lowercase();
	if lower.contains("expired") {
		RevertKind::ExpiredDeadline
	} else if lower.contains("witness") {
		RevertKind::WitnessMismatch
	} else if lower.contains("correlation") || lower.contains("id mismatch") {
		RevertKind::CorrelationMismatch
	} else if lower.contains("nonce") {
		RevertKind::NonceConsumed
	} else if lower.contains("invalidamount") || lower.contains("exceeds") {
		RevertKind::AmountExceedsPermitted
	} else if lower.contains("lengthmismatch") || lower.contains("length mismatch") {
		RevertKind::LengthMismatch
	} else if lower.contains("signer") || lower.contains("signature") {
		RevertKind::InvalidSignature
	} else {
		RevertKind::Other
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;

	fn orders() -> (OwnerOrder, RecipientOrder) {
		(
			OwnerOrder {
				order: Bytes::from(vec![1u8; 64]),
				signature: Bytes::from(vec![2u8; 65]),
			},
			RecipientOrder {
				order: Bytes::from(vec![3u8; 96]),
				signature: Bytes::from(vec![4u8; 65]),
			},
		)
	}

	#[test]
	fn test_execute_call_carries_both_orders() {
		let (owner, recipient) = orders();
		let calldata = encode_execute_call(&owner, &recipient);

		assert_eq!(
			&calldata[..4],
			IDomainBasedTransferExecutor::executeCall::SELECTOR.as_slice()
		);
		let decoded =
			IDomainBasedTransferExecutor::executeCall::abi_decode(&calldata, true).unwrap();
		assert_eq!(decoded.senderOrder.order, owner.order);
		assert_eq!(decoded.senderOrder.signature, owner.signature);
		assert_eq!(decoded.recipientOrder.order, recipient.order);
		assert_eq!(decoded.recipientOrder.signature, recipient.signature);
	}

	#[test]
	fn test_execute_signature() {
		assert_eq!(
			IDomainBasedTransferExecutor::executeCall::SIGNATURE,
			"execute((bytes,bytes),(bytes,bytes))"
		);
	}

	#[test]
	fn test_classify_custom_error_data() {
		let expired = IPermit2Errors::SignatureExpired {
			signatureDeadline: U256::from(10),
		}
		.abi_encode();
		assert_eq!(classify_revert_data(&expired), RevertKind::ExpiredDeadline);

		let nonce = IPermit2Errors::InvalidNonce {}.abi_encode();
		assert_eq!(classify_revert_data(&nonce), RevertKind::NonceConsumed);

		let amount = IPermit2Errors::InvalidAmount {
			maxAmount: U256::from(1000),
		}
		.abi_encode();
		assert_eq!(classify_revert_data(&amount), RevertKind::AmountExceedsPermitted);
	}

	#[test]
	fn test_classify_error_string_data() {
		let data = Revert {
			reason: "witness does not match recipient".to_string(),
		}
		.abi_encode();
		assert_eq!(classify_revert_data(&data), RevertKind::WitnessMismatch);
		assert_eq!(classify_revert_data(&[0x01]), RevertKind::Other);
	}

	#[test]
	fn test_classify_selector_in_message() {
		let selector = IPermit2Errors::InvalidSigner::SELECTOR;
		let message = format!(
			"server returned an error response: execution reverted, data: \"0x{:02x}{:02x}{:02x}{:02x}\"",
			selector[0], selector[1], selector[2], selector[3]
		);
		assert_eq!(classify_revert(&message), RevertKind::InvalidSignature);
	}

	#[test]
	fn test_classify_reason_phrases() {
		assert_eq!(
			classify_revert("execution reverted: order id mismatch"),
			RevertKind::CorrelationMismatch
		);
		assert_eq!(
			classify_revert("execution reverted: InvalidNonce()"),
			RevertKind::NonceConsumed
		);
		assert_eq!(
			classify_revert("execution reverted: permit expired"),
			RevertKind::ExpiredDeadline
		);
		assert_eq!(classify_revert("out of gas"), RevertKind::Other);
	}
}
