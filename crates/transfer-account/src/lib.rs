//! Account management module for the transfer system.
//!
//! This module provides the signing abstraction used by the owner, recipient and
//! executor roles. An account knows its address and can sign a 32-byte prehashed
//! digest; structured-data hashing happens in the callers so that every role
//! signs exactly the digest it computed.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use thiserror::Error;

pub use alloy_signer::Signature;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is missing or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Trait defining the interface for account implementations.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Returns the address controlled by this account.
	fn address(&self) -> Address;

	/// Signs a 32-byte digest without any message prefix.
	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError>;
}

/// Service that wraps one account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Address of the managed account.
	pub fn address(&self) -> Address {
		self.implementation.address()
	}

	/// Signs a prehashed digest with the managed account.
	pub async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		tracing::trace!(signer = %self.address(), digest = %hash, "Signing digest");
		self.implementation.sign_hash(hash).await
	}
}
