//! Core types for the netforge network bootstrapper.
//!
//! This crate provides the data model shared by the bootstrap engine and
//! its collaborators: content hashes, node identity documents, and the
//! network parameters record that every node of a bootstrapped network
//! must agree on.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod hash;
pub mod identity;
pub mod params;

pub use hash::{Hash, HashError};
pub use identity::{IdentityError, NodeIdentity, SignedNodeIdentity};
pub use params::{
    NetworkParameters, NotaryRecord, ParamsError, SignedNetworkParameters, Whitelist,
    DEFAULT_EVENT_HORIZON_MS, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_TRANSACTION_SIZE,
    DEFAULT_MIN_PLATFORM_VERSION,
};
