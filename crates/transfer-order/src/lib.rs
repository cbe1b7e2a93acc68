//! Order construction for the dual-authorization transfer.
//!
//! This crate builds the two independently signed halves of a transfer:
//!
//! - [`nonce`] derives the correlation value shared by both orders
//! - [`witness`] commits to the recipient inside the owner's signature
//! - [`permit`] assembles the owner's batch permit and the index-aligned transfer details
//! - [`signing`] holds the owner and recipient EIP-712 signers
//! - [`encoding`] ABI-encodes and strictly decodes both payloads
//! - [`verify`] re-runs the settlement checks locally against a signed pair
//!
//! Errors are grouped by stage so that callers can tell a malformed request
//! from a signer failure or a payload that does not decode.

use alloy_primitives::{Address, U256};
use thiserror::Error;
use transfer_account::AccountError;
use transfer_types::SigningRole;

pub mod encoding;
pub mod nonce;
pub mod permit;
pub mod signing;
pub mod verify;
pub mod witness;

pub use encoding::{
	decode_owner_order, decode_recipient_order, encode_owner_order, encode_recipient_order,
};
pub use nonce::{derive_nonce, derive_salted_nonce, NonceGenerator};
pub use permit::{PermitBuilder, TransferPlan};
pub use signing::{signing_domain, sign_pair, OwnerSigner, RecipientSigner, TypedDataSigner};
pub use verify::{OrderVerifier, VerifiedTransfer};
pub use witness::{hash_witness, witness_for};

/// Errors raised while assembling a permit or transfer plan, before anything is signed.
#[derive(Debug, Error)]
pub enum ConstructionError {
	#[error("Permit must contain at least one token entry")]
	EmptyPermitted,
	#[error("Invalid amount: {0}")]
	InvalidAmount(String),
	#[error("Time-to-live must be greater than zero")]
	NonPositiveTtl,
	#[error("Deadline overflows: now {now} + ttl {ttl}")]
	DeadlineOverflow { now: u64, ttl: u64 },
	#[error("Length mismatch: {permitted} permitted entries, {details} transfer details")]
	LengthMismatch { permitted: usize, details: usize },
	#[error("No transfer leg pays recipient {0}")]
	MissingRecipientLeg(Address),
}

/// Errors raised by a signing role.
#[derive(Debug, Error)]
pub enum SigningError {
	#[error("Key material unavailable: {0}")]
	KeyUnavailable(String),
	#[error("Signer failed: {0}")]
	Signer(String),
	#[error("Invalid {role} message: {reason}")]
	InvalidMessage { role: SigningRole, reason: String },
}

impl From<AccountError> for SigningError {
	fn from(err: AccountError) -> Self {
		match err {
			AccountError::InvalidKey(msg) => SigningError::KeyUnavailable(msg),
			AccountError::SigningFailed(msg) => SigningError::Signer(msg),
		}
	}
}

/// Errors raised while decoding a payload.
#[derive(Debug, Error)]
pub enum EncodingError {
	#[error("Failed to decode {payload} payload: {reason}")]
	Decode {
		payload: &'static str,
		reason: String,
	},
	#[error("Non-canonical {payload} payload: {reason}")]
	NonCanonical {
		payload: &'static str,
		reason: String,
	},
}

/// Checks the settlement contract would fail, reproduced locally.
#[derive(Debug, Error)]
pub enum VerificationError {
	#[error("Permit expired: deadline {deadline}, now {now}")]
	Expired { deadline: U256, now: u64 },
	#[error("Malformed {role} signature: {reason}")]
	MalformedSignature { role: SigningRole, reason: String },
	#[error("Invalid {role} signature: expected {expected}, recovered {recovered}")]
	InvalidSignature {
		role: SigningRole,
		expected: Address,
		recovered: Address,
	},
	#[error("Witness mismatch: payload carries a witness not bound to recipient {recipient}")]
	WitnessMismatch { recipient: Address },
	#[error("Transfer {index} requests {requested}, permitted {permitted}")]
	AmountExceedsPermitted {
		index: usize,
		requested: U256,
		permitted: U256,
	},
	#[error("Correlation mismatch: permit nonce {nonce}, recipient order id {id}")]
	CorrelationMismatch { nonce: U256, id: U256 },
	#[error("Length mismatch: {permitted} permitted entries, {details} transfer details")]
	LengthMismatch { permitted: usize, details: usize },
	#[error(transparent)]
	Encoding(#[from] EncodingError),
}

/// Any error raised while building a signed order pair.
#[derive(Debug, Error)]
pub enum OrderError {
	#[error("Construction error: {0}")]
	Construction(#[from] ConstructionError),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Encoding error: {0}")]
	Encoding(#[from] EncodingError),
	#[error("Verification error: {0}")]
	Verification(#[from] VerificationError),
}
