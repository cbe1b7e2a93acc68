//! EIP-712 signing roles.
//!
//! Both roles sign under the same domain (`Permit2`, version, chain, permit2
//! contract) but over different primary types, so a signature produced for one
//! schema never validates under the other.

use crate::SigningError;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use async_trait::async_trait;
use std::sync::Arc;
use transfer_account::{AccountService, Signature};
use transfer_config::Config;
use transfer_types::{PermitBatchWitnessTransferFrom, RecipientOrderDetail, SigningRole};

/// The domain shared by the owner and recipient schemas.
pub fn signing_domain(config: &Config) -> Eip712Domain {
	Eip712Domain::new(
		Some(config.domain.name.clone().into()),
		Some(config.domain.version.clone().into()),
		Some(U256::from(config.network.chain_id)),
		Some(config.contracts.permit2),
		None,
	)
}

/// A party that signs one typed-data schema with its own account.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
	/// The EIP-712 primary type this role signs.
	type Message: SolStruct + Send + Sync;

	const ROLE: SigningRole;

	fn account(&self) -> &AccountService;

	/// Rejects messages that should never be signed.
	fn validate(&self, message: &Self::Message) -> Result<(), SigningError>;

	fn address(&self) -> Address {
		self.account().address()
	}

	/// Signs `message` under `domain` and returns the 65-byte signature.
	async fn sign(
		&self,
		domain: &Eip712Domain,
		message: &Self::Message,
	) -> Result<Signature, SigningError> {
		self.validate(message)?;
		let digest = message.eip712_signing_hash(domain);
		tracing::debug!(
			role = %Self::ROLE,
			primary_type = <Self::Message as SolStruct>::NAME,
			signer = %self.address(),
			digest = %digest,
			"Signing typed data"
		);
		Ok(self.account().sign_hash(&digest).await?)
	}
}

/// Signs `PermitBatchWitnessTransferFrom` as the token owner.
#[derive(Clone)]
pub struct OwnerSigner {
	account: Arc<AccountService>,
}

impl OwnerSigner {
	pub fn new(account: Arc<AccountService>) -> Self {
		Self { account }
	}
}

#[async_trait]
impl TypedDataSigner for OwnerSigner {
	type Message = PermitBatchWitnessTransferFrom;

	const ROLE: SigningRole = SigningRole::Owner;

	fn account(&self) -> &AccountService {
		&self.account
	}

	fn validate(&self, message: &Self::Message) -> Result<(), SigningError> {
		let reason = if message.permitted.is_empty() {
			"permit has no token entries"
		} else if message.witness == B256::ZERO {
			"permit is not bound to a recipient witness"
		} else {
			return Ok(());
		};
		Err(SigningError::InvalidMessage {
			role: Self::ROLE,
			reason: reason.to_string(),
		})
	}
}

/// Signs `RecipientOrderDetail` as the recipient.
#[derive(Clone)]
pub struct RecipientSigner {
	account: Arc<AccountService>,
}

impl RecipientSigner {
	pub fn new(account: Arc<AccountService>) -> Self {
		Self { account }
	}
}

#[async_trait]
impl TypedDataSigner for RecipientSigner {
	type Message = RecipientOrderDetail;

	const ROLE: SigningRole = SigningRole::Recipient;

	fn account(&self) -> &AccountService {
		&self.account
	}

	fn validate(&self, message: &Self::Message) -> Result<(), SigningError> {
		if message.to != self.address() {
			return Err(SigningError::InvalidMessage {
				role: Self::ROLE,
				reason: format!(
					"order pays {} but signer is {}",
					message.to,
					self.address()
				),
			});
		}
		Ok(())
	}
}

/// Issues the owner and recipient signatures concurrently.
///
/// Neither signature depends on the other; both only need the shared nonce.
pub async fn sign_pair(
	owner: &OwnerSigner,
	recipient: &RecipientSigner,
	domain: &Eip712Domain,
	permit: &PermitBatchWitnessTransferFrom,
	detail: &RecipientOrderDetail,
) -> Result<(Signature, Signature), SigningError> {
	tokio::try_join!(owner.sign(domain, permit), recipient.sign(domain, detail))
}
