//! Configuration builder for test and development configurations.
//!
//! Defaults use the well-known local development keys and the Permit2 canonical
//! address, so a built `Config` can sign real orders without any environment.

use crate::{
	AccountConfig, AccountsConfig, Config, ContractsConfig, DomainConfig, ExecutionConfig,
	NetworkConfig, NonceStrategy, OrderConfig, TimeSource, TransferConfig, TransferLeg,
};
use alloy_primitives::{address, Address};

/// Development key #0; used as the owner by default.
pub const DEV_OWNER_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Development key #1; used as the recipient by default.
pub const DEV_RECIPIENT_KEY: &str =
	"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
/// Development key #2; used as the executor by default.
pub const DEV_EXECUTOR_KEY: &str =
	"0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

/// Address of `DEV_RECIPIENT_KEY`.
pub const DEV_RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
/// Address of `DEV_EXECUTOR_KEY`.
pub const DEV_EXECUTOR: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	chain_id: u64,
	rpc_url: String,
	permit2: Address,
	settlement: Address,
	token: Address,
	ttl_seconds: u64,
	nonce_strategy: NonceStrategy,
	time_source: TimeSource,
	recipient: Address,
	legs: Vec<TransferLeg>,
	preflight: bool,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a builder paying 1000 units to the recipient and 1000 to the executor.
	pub fn new() -> Self {
		Self {
			chain_id: 31337,
			rpc_url: "http://localhost:8545".to_string(),
			permit2: address!("000000000022D473030F116dDEE9F6B43aC78BA3"),
			settlement: address!("13BA675494dE227Bd0976aC3390502795F7E92A0"),
			token: address!("0FA8781a83E46826621b3BC094Ea2A0212e71B23"),
			ttl_seconds: 3600,
			nonce_strategy: NonceStrategy::Random,
			time_source: TimeSource::System,
			recipient: DEV_RECIPIENT,
			legs: vec![
				TransferLeg {
					to: DEV_RECIPIENT,
					amount: "1000".to_string(),
					permitted_amount: None,
				},
				TransferLeg {
					to: DEV_EXECUTOR,
					amount: "1000".to_string(),
					permitted_amount: None,
				},
			],
			preflight: true,
		}
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn settlement(mut self, settlement: Address) -> Self {
		self.settlement = settlement;
		self
	}

	pub fn ttl_seconds(mut self, ttl_seconds: u64) -> Self {
		self.ttl_seconds = ttl_seconds;
		self
	}

	pub fn nonce_strategy(mut self, strategy: NonceStrategy) -> Self {
		self.nonce_strategy = strategy;
		self
	}

	pub fn time_source(mut self, source: TimeSource) -> Self {
		self.time_source = source;
		self
	}

	/// Replaces the transfer legs.
	pub fn legs(mut self, legs: Vec<TransferLeg>) -> Self {
		self.legs = legs;
		self
	}

	pub fn preflight(mut self, enabled: bool) -> Self {
		self.preflight = enabled;
		self
	}

	/// Builds the `Config`. No validation is applied.
	pub fn build(self) -> Config {
		Config {
			network: NetworkConfig {
				chain_id: self.chain_id,
				rpc_url: self.rpc_url,
			},
			contracts: ContractsConfig {
				permit2: self.permit2,
				settlement: self.settlement,
				token: self.token,
			},
			accounts: AccountsConfig {
				owner: AccountConfig {
					private_key: DEV_OWNER_KEY.into(),
				},
				recipient: AccountConfig {
					private_key: DEV_RECIPIENT_KEY.into(),
				},
				executor: AccountConfig {
					private_key: DEV_EXECUTOR_KEY.into(),
				},
			},
			domain: DomainConfig::default(),
			order: OrderConfig {
				ttl_seconds: self.ttl_seconds,
				nonce_strategy: self.nonce_strategy,
				time_source: self.time_source,
			},
			transfer: TransferConfig {
				recipient: self.recipient,
				legs: self.legs,
			},
			execution: ExecutionConfig {
				preflight: self.preflight,
				confirmations: 1,
			},
		}
	}
}
