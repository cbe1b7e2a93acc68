//! Local private-key account.
//!
//! Keys come from configuration (normally `${ENV_VAR}` references) and are held
//! as `PrivateKeySigner`; nothing touches the network.

use crate::{AccountError, AccountInterface, Signature};
use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use transfer_config::AccountConfig;
use transfer_types::SecretString;

/// Account backed by an in-memory secp256k1 key.
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Parses a hex private key (with or without `0x`).
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		if private_key.is_empty() {
			return Err(AccountError::InvalidKey("private key is empty".to_string()));
		}
		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.trim()
				.parse()
				.map_err(|_| AccountError::InvalidKey("Invalid private key format".to_string()))
		})?;

		Ok(Self { signer })
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		self.signer
			.sign_hash(hash)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))
	}
}

/// Factory function to create a local account from its configuration section.
pub fn create_account(config: &AccountConfig) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(LocalWallet::new(&config.private_key)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::AccountService;
	use alloy_primitives::{address, keccak256};
	use transfer_config::builders::config::DEV_OWNER_KEY;

	#[test]
	fn test_address_from_key() {
		let wallet = LocalWallet::new(&DEV_OWNER_KEY.into()).unwrap();
		assert_eq!(
			wallet.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[test]
	fn test_invalid_keys_rejected() {
		assert!(matches!(
			LocalWallet::new(&"".into()),
			Err(AccountError::InvalidKey(_))
		));
		assert!(matches!(
			LocalWallet::new(&"0xnot-a-key".into()),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[tokio::test]
	async fn test_signature_recovers_to_account() {
		let config = AccountConfig {
			private_key: DEV_OWNER_KEY.into(),
		};
		let service = AccountService::new(create_account(&config).unwrap());
		let digest = keccak256(b"dual authorization");

		let signature = service.sign_hash(&digest).await.unwrap();
		let recovered = signature.recover_address_from_prehash(&digest).unwrap();
		assert_eq!(recovered, service.address());
	}
}
