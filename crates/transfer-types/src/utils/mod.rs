//! Utility functions for hashing and formatting.
//!
//! This module provides the hand-rolled EIP-712 struct hashing used for
//! independent digest recomputation, plus small formatting and time helpers.

pub mod conversion;
pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use conversion::parse_token_amount;
pub use eip712::{
	compute_domain_hash, compute_final_digest, hash_permit_with_witness,
	hash_recipient_order_detail, hash_token_permissions, owner_type_hash, recipient_type_hash,
	Eip712AbiEncoder, DOMAIN_TYPE, PERMIT_BATCH_WITNESS_TYPE, RECIPIENT_ORDER_DETAIL_TYPE,
	TOKEN_PERMISSIONS_TYPE,
};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
