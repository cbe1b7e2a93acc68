//! Time source for nonce derivation and preflight.

use std::sync::Arc;
use transfer_config::TimeSource;
use transfer_delivery::{DeliveryError, DeliveryService};
use transfer_types::current_timestamp;

/// Reads "now" from the configured source.
///
/// The settlement contract checks deadlines against block time.
pub struct Clock {
	source: TimeSource,
	delivery: Arc<DeliveryService>,
}

impl Clock {
	pub fn new(source: TimeSource, delivery: Arc<DeliveryService>) -> Self {
		Self { source, delivery }
	}

	/// Current time in seconds.
	pub async fn now(&self) -> Result<u64, DeliveryError> {
		match self.source {
			TimeSource::Block => self.delivery.latest_block_timestamp().await,
			TimeSource::System => Ok(current_timestamp()),
		}
	}
}
