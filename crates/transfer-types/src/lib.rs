//! Common types module for the dual-authorization transfer system.
//!
//! This module defines the data types shared by every transfer component: the
//! Solidity schemas that are signed and ABI-encoded, the signed order envelopes
//! handed to the settlement contract, execution receipts, and secret handling.

/// Execution receipt types for settlement submissions.
pub mod delivery;
/// Solidity schemas and signed order envelopes.
pub mod order;
/// Redacting wrapper for key material.
pub mod secret_string;
/// Utility functions for hashing and formatting.
pub mod utils;

pub use delivery::*;
pub use order::*;
pub use secret_string::SecretString;
pub use utils::{
	current_timestamp, parse_token_amount, truncate_id, with_0x_prefix, without_0x_prefix,
};

// Re-export the primitive types every crate needs
pub use alloy_primitives::{Address, Bytes, B256, U256};
