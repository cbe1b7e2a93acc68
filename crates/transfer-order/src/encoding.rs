//! ABI payloads handed to the settlement contract.
//!
//! The owner payload is `abi.encode(PermitBatchTransferFrom permit,
//! SignatureTransferDetails[] transferDetails, address owner, bytes32 witness)`
//! and the recipient payload is `abi.encode(address to, uint256 amount, uint256 id)`.
//! Both are encoded as parameter lists, not as a single wrapped tuple.
//!
//! Decoding is strict: besides the type checks performed by the decoder, the
//! decoded value must re-encode to exactly the input bytes, so trailing data or
//! dirty padding is rejected instead of silently ignored.

use crate::EncodingError;
use alloy_primitives::Bytes;
use alloy_sol_types::SolType;
use transfer_types::{OwnerOrderDetail, RecipientOrderDetail};

const OWNER_PAYLOAD: &str = "owner";
const RECIPIENT_PAYLOAD: &str = "recipient";

pub fn encode_owner_order(detail: &OwnerOrderDetail) -> Bytes {
	<OwnerOrderDetail as SolType>::abi_encode_params(detail).into()
}

pub fn decode_owner_order(data: &[u8]) -> Result<OwnerOrderDetail, EncodingError> {
	let detail = <OwnerOrderDetail as SolType>::abi_decode_params(data, true).map_err(|e| {
		EncodingError::Decode {
			payload: OWNER_PAYLOAD,
			reason: e.to_string(),
		}
	})?;
	ensure_canonical(
		OWNER_PAYLOAD,
		data,
		&<OwnerOrderDetail as SolType>::abi_encode_params(&detail),
	)?;
	Ok(detail)
}

pub fn encode_recipient_order(detail: &RecipientOrderDetail) -> Bytes {
	<RecipientOrderDetail as SolType>::abi_encode_params(detail).into()
}

pub fn decode_recipient_order(data: &[u8]) -> Result<RecipientOrderDetail, EncodingError> {
	let detail = <RecipientOrderDetail as SolType>::abi_decode_params(data, true).map_err(|e| {
		EncodingError::Decode {
			payload: RECIPIENT_PAYLOAD,
			reason: e.to_string(),
		}
	})?;
	ensure_canonical(
		RECIPIENT_PAYLOAD,
		data,
		&<RecipientOrderDetail as SolType>::abi_encode_params(&detail),
	)?;
	Ok(detail)
}

fn ensure_canonical(
	payload: &'static str,
	input: &[u8],
	reencoded: &[u8],
) -> Result<(), EncodingError> {
	if input.len() != reencoded.len() {
		return Err(EncodingError::NonCanonical {
			payload,
			reason: format!(
				"{} bytes given, canonical encoding is {} bytes",
				input.len(),
				reencoded.len()
			),
		});
	}
	if let Some(offset) = input.iter().zip(reencoded).position(|(a, b)| a != b) {
		return Err(EncodingError::NonCanonical {
			payload,
			reason: format!("byte {} differs from canonical encoding", offset),
		});
	}
	Ok(())
}
