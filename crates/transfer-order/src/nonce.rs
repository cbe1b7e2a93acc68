//! Nonce derivation.
//!
//! The nonce is the single value shared by both orders: the owner signs it as the
//! permit nonce and the recipient signs it as the order `id`. It is derived as
//! `keccak256(abi.encodePacked(address contract, address owner, uint256 time))`,
//! optionally followed by a 32-byte salt so that two orders built in the same
//! second do not collide.

use alloy_primitives::{keccak256, Address, B256, U256};
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};
use transfer_config::NonceStrategy;

/// `keccak256(contract ‖ owner ‖ time)` over the 20 + 20 + 32 packed bytes.
pub fn derive_nonce(contract: Address, owner: Address, time: U256) -> U256 {
	U256::from_be_bytes(keccak256(packed(contract, owner, time, None)).0)
}

/// `keccak256(contract ‖ owner ‖ time ‖ salt)`.
pub fn derive_salted_nonce(contract: Address, owner: Address, time: U256, salt: B256) -> U256 {
	U256::from_be_bytes(keccak256(packed(contract, owner, time, Some(salt))).0)
}

fn packed(contract: Address, owner: Address, time: U256, salt: Option<B256>) -> Vec<u8> {
	let mut buf = Vec::with_capacity(20 + 20 + 32 + 32);
	buf.extend_from_slice(contract.as_slice());
	buf.extend_from_slice(owner.as_slice());
	buf.extend_from_slice(&time.to_be_bytes::<32>());
	if let Some(salt) = salt {
		buf.extend_from_slice(salt.as_slice());
	}
	buf
}

/// Produces nonces for one settlement contract according to a [`NonceStrategy`].
#[derive(Debug)]
pub struct NonceGenerator {
	contract: Address,
	strategy: NonceStrategy,
	counter: AtomicU64,
}

impl NonceGenerator {
	pub fn new(contract: Address, strategy: NonceStrategy) -> Self {
		Self {
			contract,
			strategy,
			counter: AtomicU64::new(0),
		}
	}

	/// Derives the next nonce for `owner` at `time`.
	pub fn next(&self, owner: Address, time: u64) -> U256 {
		let time = U256::from(time);
		let nonce = match self.strategy {
			NonceStrategy::Timestamp => derive_nonce(self.contract, owner, time),
			NonceStrategy::Counter => {
				let count = self.counter.fetch_add(1, Ordering::Relaxed);
				derive_salted_nonce(self.contract, owner, time, B256::from(U256::from(count)))
			},
			NonceStrategy::Random => {
				let mut salt = B256::ZERO;
				rand::thread_rng().fill_bytes(&mut salt.0);
				derive_salted_nonce(self.contract, owner, time, salt)
			},
		};
		tracing::debug!(
			strategy = ?self.strategy,
			owner = %owner,
			time = %time,
			nonce = %nonce,
			"Derived nonce"
		);
		nonce
	}
}
