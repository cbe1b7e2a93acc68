//! Settlement submission types.
//!
//! This module defines what the executor boundary reports back after the
//! order pair has been mined.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Receipt of a settled `execute(senderOrder, recipientOrder)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
	/// The hash of the settlement transaction.
	pub tx_hash: B256,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the settlement call executed successfully.
	pub success: bool,
}
