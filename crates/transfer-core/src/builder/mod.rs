//! Builder pattern for constructing transfer engines.
//!
//! Account and executor implementations are supplied as factory functions so
//! that the binary can plug in local keys and an RPC executor while tests plug
//! in mocks.

use crate::engine::TransferEngine;
use std::sync::Arc;
use thiserror::Error;
use transfer_account::{AccountError, AccountInterface, AccountService};
use transfer_config::{AccountConfig, Config};
use transfer_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use transfer_order::{
	signing_domain, NonceGenerator, OrderVerifier, OwnerSigner, RecipientSigner, TransferPlan,
};

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Failed to create {component}: {reason}")]
	Component {
		component: &'static str,
		reason: String,
	},
}

/// Builder for constructing a TransferEngine with pluggable implementations.
pub struct TransferBuilder {
	config: Config,
}

impl TransferBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, creating both signing accounts and the executor.
	pub fn build<AF, DF>(
		self,
		account_factory: AF,
		delivery_factory: DF,
	) -> Result<TransferEngine, BuilderError>
	where
		AF: Fn(&AccountConfig) -> Result<Box<dyn AccountInterface>, AccountError>,
		DF: Fn(&Config) -> Result<Box<dyn DeliveryInterface>, DeliveryError>,
	{
		let config = self.config;

		let owner = create_account_service("owner", &config.accounts.owner, &account_factory)?;
		let recipient =
			create_account_service("recipient", &config.accounts.recipient, &account_factory)?;

		let plan = TransferPlan::from_config(&config.transfer, config.contracts.token)
			.map_err(|e| BuilderError::Config(e.to_string()))?;
		if recipient.address() != plan.recipient() {
			return Err(BuilderError::Config(format!(
				"Recipient account {} does not match transfer recipient {}",
				recipient.address(),
				plan.recipient()
			)));
		}

		let executor = delivery_factory(&config).map_err(|e| {
			tracing::error!(component = "delivery", error = %e, "Failed to create executor");
			BuilderError::Component {
				component: "delivery",
				reason: e.to_string(),
			}
		})?;
		tracing::info!(
			component = "delivery",
			executor = %executor.executor_address(),
			settlement = %config.contracts.settlement,
			"Loaded"
		);
		let delivery = Arc::new(DeliveryService::new(
			executor,
			config.execution.confirmations,
		));

		let domain = signing_domain(&config);
		let verifier = OrderVerifier::from_config(&config);
		let nonces = NonceGenerator::new(config.contracts.settlement, config.order.nonce_strategy);

		tracing::info!(
			chain_id = config.network.chain_id,
			permit2 = %config.contracts.permit2,
			nonce_strategy = ?config.order.nonce_strategy,
			time_source = ?config.order.time_source,
			"Transfer engine ready"
		);

		Ok(TransferEngine::new(
			config,
			plan,
			domain,
			OwnerSigner::new(owner),
			RecipientSigner::new(recipient),
			nonces,
			verifier,
			delivery,
		))
	}
}

fn create_account_service<AF>(
	role: &'static str,
	config: &AccountConfig,
	factory: &AF,
) -> Result<Arc<AccountService>, BuilderError>
where
	AF: Fn(&AccountConfig) -> Result<Box<dyn AccountInterface>, AccountError>,
{
	match factory(config) {
		Ok(implementation) => {
			let service = AccountService::new(implementation);
			tracing::info!(component = "account", role = role, address = %service.address(), "Loaded");
			Ok(Arc::new(service))
		},
		Err(e) => {
			tracing::error!(component = "account", role = role, error = %e, "Failed to create account");
			Err(BuilderError::Component {
				component: role,
				reason: e.to_string(),
			})
		},
	}
}
