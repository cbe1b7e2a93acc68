//! Main entry point for the dual-authorization transfer service.
//!
//! Loads a configuration, builds a signed owner/recipient order pair, checks it
//! locally and submits it to the settlement contract. The resulting pair, its
//! decoded payloads and the receipt are printed as JSON on stdout.

use clap::Parser;
use std::path::PathBuf;
use transfer_config::Config;
use transfer_core::{TransferBuilder, TransferEngine};

use transfer_account::implementations::local::create_account;
use transfer_delivery::implementations::evm::alloy::create_executor;

/// Command-line arguments for the transfer service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "TRANSFER_CONFIG", default_value = "config/demo.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Build, sign and check the order pair without submitting it
	#[arg(long)]
	dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so that stdout carries only the JSON report.
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(
		chain_id = config.network.chain_id,
		settlement = %config.contracts.settlement,
		"Loaded configuration"
	);

	let engine = build_engine(config)?;
	let report = match engine.run(args.dry_run).await {
		Ok(report) => report,
		Err(e) => {
			tracing::error!(error = %e, "Transfer failed");
			return Err(e.into());
		},
	};

	println!("{}", serde_json::to_string_pretty(&report)?);
	Ok(())
}

/// Builds the engine with local keys and the Alloy executor.
fn build_engine(config: Config) -> Result<TransferEngine, Box<dyn std::error::Error>> {
	Ok(TransferBuilder::new(config).build(create_account, create_executor)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_args_defaults() {
		let args = Args::try_parse_from(["transfer"]).unwrap();
		assert_eq!(args.log_level, "info");
		assert!(!args.dry_run);
	}

	#[test]
	fn test_args_dry_run() {
		let args =
			Args::try_parse_from(["transfer", "--config", "other.toml", "--dry-run", "-l", "debug"])
				.unwrap();
		assert_eq!(args.config, PathBuf::from("other.toml"));
		assert_eq!(args.log_level, "debug");
		assert!(args.dry_run);
	}

	#[test]
	fn test_build_engine_from_dev_config() {
		let config = transfer_config::ConfigBuilder::new().build();
		let engine = build_engine(config).unwrap();
		assert_eq!(engine.plan().transfer_details().len(), 2);
	}
}
