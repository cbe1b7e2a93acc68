//! Core engine for the dual-authorization transfer system.
//!
//! This module wires the owner and recipient signers, the nonce generator, the
//! local verifier and the settlement executor into a [`TransferEngine`] that
//! builds a signed order pair and submits it. Components are created from
//! configuration through factory functions by the [`TransferBuilder`].

pub mod builder;
pub mod engine;

pub use builder::{BuilderError, TransferBuilder};
pub use engine::{DecodedOrders, TransferEngine, TransferError, TransferReport};
