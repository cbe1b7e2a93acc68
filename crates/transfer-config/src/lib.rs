//! Configuration module for the dual-authorization transfer system.
//!
//! This module provides structures and utilities for managing transfer configuration.
//! Every value the order construction needs from the outside world (network endpoint,
//! contract addresses, key material, signing domain) is supplied here and passed
//! explicitly into component constructors.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["accounts.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)
//! - `${VAR}` and `${VAR:-default}` are substituted from the environment

pub mod builders {
	pub mod config;
}
mod loader;

pub use builders::config::ConfigBuilder;

use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use transfer_types::{parse_token_amount, SecretString};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Chain connection settings.
	pub network: NetworkConfig,
	/// On-chain contract identities.
	pub contracts: ContractsConfig,
	/// Key material for the three participating accounts.
	pub accounts: AccountsConfig,
	/// EIP-712 signing domain shared by both roles.
	#[serde(default)]
	pub domain: DomainConfig,
	/// Permit and nonce construction settings.
	#[serde(default)]
	pub order: OrderConfig,
	/// What to transfer and to whom.
	pub transfer: TransferConfig,
	/// Submission settings.
	#[serde(default)]
	pub execution: ExecutionConfig,
}

/// Chain connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	/// Chain ID, also used as the EIP-712 domain `chainId`.
	pub chain_id: u64,
	/// HTTP(S) RPC endpoint.
	pub rpc_url: String,
}

/// Contract addresses used by the transfer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractsConfig {
	/// Permit-processing contract; the EIP-712 `verifyingContract`.
	pub permit2: Address,
	/// Settlement contract exposing `execute(senderOrder, recipientOrder)`.
	/// Also the contract identity hashed into the nonce.
	pub settlement: Address,
	/// Token moved by the permit.
	pub token: Address,
}

/// Key material for the owner, recipient and executor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountsConfig {
	pub owner: AccountConfig,
	pub recipient: AccountConfig,
	pub executor: AccountConfig,
}

/// A single local account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded secp256k1 private key, usually `${ENV_VAR}`.
	pub private_key: SecretString,
}

/// EIP-712 domain name and version. Chain ID and verifying contract come from
/// `network.chain_id` and `contracts.permit2`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	#[serde(default = "default_domain_name")]
	pub name: String,
	#[serde(default = "default_domain_version")]
	pub version: String,
}

impl Default for DomainConfig {
	fn default() -> Self {
		Self {
			name: default_domain_name(),
			version: default_domain_version(),
		}
	}
}

fn default_domain_name() -> String {
	"Permit2".to_string()
}

fn default_domain_version() -> String {
	"1".to_string()
}

/// How the salt of a nonce is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceStrategy {
	/// Random 256-bit salt per nonce.
	#[default]
	Random,
	/// Monotonic in-process counter as salt.
	Counter,
	/// No salt: `keccak256(contract, owner, time)` only.
	Timestamp,
}

/// Where the time value hashed into the nonce comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
	/// Timestamp of the latest block.
	#[default]
	Block,
	/// Local wall clock.
	System,
}

/// Permit and nonce construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderConfig {
	/// Permit lifetime in seconds; `deadline = now + ttl_seconds`.
	#[serde(default = "default_ttl_seconds")]
	pub ttl_seconds: u64,
	#[serde(default)]
	pub nonce_strategy: NonceStrategy,
	#[serde(default)]
	pub time_source: TimeSource,
}

impl Default for OrderConfig {
	fn default() -> Self {
		Self {
			ttl_seconds: default_ttl_seconds(),
			nonce_strategy: NonceStrategy::default(),
			time_source: TimeSource::default(),
		}
	}
}

fn default_ttl_seconds() -> u64 {
	3600
}

/// One permitted entry and the transfer drawn against it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferLeg {
	/// Destination of this leg.
	pub to: Address,
	/// Requested amount as a base-10 string.
	pub amount: String,
	/// Permitted amount if larger than `amount`.
	#[serde(default)]
	pub permitted_amount: Option<String>,
}

/// What to transfer and to whom.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferConfig {
	/// Recipient bound by the witness and counter-signing the order.
	pub recipient: Address,
	/// Index-aligned legs; each becomes one permitted entry and one transfer detail.
	pub legs: Vec<TransferLeg>,
}

/// Submission settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
	/// Run the settlement checks locally before submitting.
	#[serde(default = "default_preflight")]
	pub preflight: bool,
	/// Confirmations to wait for after submission.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
}

impl Default for ExecutionConfig {
	fn default() -> Self {
		Self {
			preflight: default_preflight(),
			confirmations: default_confirmations(),
		}
	}
}

fn default_preflight() -> bool {
	true
}

fn default_confirmations() -> u64 {
	1
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
/// Input is capped at 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration.
	///
	/// Checks:
	/// - Chain ID is non-zero and an RPC URL is set
	/// - All three accounts carry key material
	/// - Domain name and version are set
	/// - The permit TTL is positive
	/// - At least one transfer leg exists, amounts parse as uint256 and
	///   permitted amounts cover requested amounts
	/// - At least one leg pays the configured recipient
	/// - Confirmations are within 1..=100
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation("network.chain_id cannot be 0".into()));
		}
		if self.network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("network.rpc_url cannot be empty".into()));
		}

		for (role, account) in [
			("owner", &self.accounts.owner),
			("recipient", &self.accounts.recipient),
			("executor", &self.accounts.executor),
		] {
			if account.private_key.is_empty() {
				return Err(ConfigError::Validation(format!(
					"accounts.{}.private_key cannot be empty",
					role
				)));
			}
		}

		if self.domain.name.is_empty() || self.domain.version.is_empty() {
			return Err(ConfigError::Validation(
				"domain name and version cannot be empty".into(),
			));
		}

		if self.order.ttl_seconds == 0 {
			return Err(ConfigError::Validation(
				"order.ttl_seconds must be greater than 0".into(),
			));
		}

		if self.transfer.legs.is_empty() {
			return Err(ConfigError::Validation(
				"At least one transfer leg must be configured".into(),
			));
		}
		for (index, leg) in self.transfer.legs.iter().enumerate() {
			let amount = parse_token_amount(&leg.amount).map_err(|e| {
				ConfigError::Validation(format!("transfer.legs[{}]: {}", index, e))
			})?;
			if let Some(permitted) = &leg.permitted_amount {
				let permitted = parse_token_amount(permitted).map_err(|e| {
					ConfigError::Validation(format!("transfer.legs[{}]: {}", index, e))
				})?;
				if permitted < amount {
					return Err(ConfigError::Validation(format!(
						"transfer.legs[{}]: permitted_amount {} is below amount {}",
						index, permitted, amount
					)));
				}
			}
		}
		if !self
			.transfer
			.legs
			.iter()
			.any(|leg| leg.to == self.transfer.recipient)
		{
			return Err(ConfigError::Validation(format!(
				"No transfer leg pays the recipient {}",
				self.transfer.recipient
			)));
		}

		if self.execution.confirmations == 0 {
			return Err(ConfigError::Validation(
				"execution.confirmations must be at least 1".into(),
			));
		}
		if self.execution.confirmations > 100 {
			return Err(ConfigError::Validation(
				"execution.confirmations cannot exceed 100".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
