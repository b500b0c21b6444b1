//! Network parameters: the record every node of a bootstrapped network
//! must agree on.
//!
//! A parameters file is written identically into every node directory.
//! Collections are canonicalized (notaries sorted by legal name, the
//! whitelist a sorted map) so that structural equality between two
//! records is meaningful: the bootstrapper only bumps the epoch when a
//! re-run actually changed the content.

use crate::hash::Hash;
use crate::identity::NodeIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Minimum platform version a fresh network starts at.
pub const DEFAULT_MIN_PLATFORM_VERSION: u32 = 1;

/// Maximum peer-to-peer message size in bytes (10 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum transaction size in bytes (512 MiB).
pub const DEFAULT_MAX_TRANSACTION_SIZE: u64 = 512 * 1024 * 1024;

/// Event horizon in milliseconds (30 days): how long a node may be
/// unreachable before peers may evict it.
pub const DEFAULT_EVENT_HORIZON_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Whitelist of permitted application code: fully-qualified contract
/// name to the ordered set of content hashes allowed to execute under
/// that name.
pub type Whitelist = BTreeMap<String, Vec<Hash>>;

/// One notary entry in the network parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryRecord {
    /// The notary node's primary legal identity.
    pub identity: NodeIdentity,

    /// Whether the notary validates transaction contents.
    pub validating: bool,
}

/// The network-wide parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// Minimum platform version nodes must run.
    pub min_platform_version: u32,

    /// Notaries, sorted by legal name.
    pub notaries: Vec<NotaryRecord>,

    /// Maximum peer-to-peer message size in bytes.
    pub max_message_size: u64,

    /// Maximum transaction size in bytes.
    pub max_transaction_size: u64,

    /// Permitted application code by contract name.
    pub whitelist: Whitelist,

    /// Event horizon in milliseconds.
    pub event_horizon_ms: u64,

    /// Version counter, starts at 1 and only ever increases.
    pub epoch: u32,

    /// RFC3339 timestamp of the last content change.
    pub modified_time: String,
}

impl NetworkParameters {
    /// Canonical byte encoding used as the signing payload.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ParamsError> {
        serde_json::to_vec(self).map_err(|e| ParamsError::Serialize(e.to_string()))
    }

    /// Check structural invariants: positive epoch, notaries unique and
    /// sorted by legal name, no empty whitelist entries.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.epoch == 0 {
            return Err(ParamsError::InvalidField {
                field: "epoch",
                reason: "must be positive".into(),
            });
        }
        for pair in self.notaries.windows(2) {
            if pair[0].identity.legal_name >= pair[1].identity.legal_name {
                return Err(ParamsError::InvalidField {
                    field: "notaries",
                    reason: format!(
                        "not sorted or duplicate legal name: {}",
                        pair[1].identity.legal_name
                    ),
                });
            }
        }
        for (name, hashes) in &self.whitelist {
            if hashes.is_empty() {
                return Err(ParamsError::InvalidField {
                    field: "whitelist",
                    reason: format!("no hashes for contract {name}"),
                });
            }
        }
        Ok(())
    }
}

/// [`NetworkParameters`] countersigned by the network trust root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedNetworkParameters {
    /// The parameter set.
    pub parameters: NetworkParameters,

    /// Ed25519 signature over [`NetworkParameters::canonical_bytes`],
    /// lowercase hex.
    pub signature: String,

    /// Signing public key, lowercase hex. Must match the trust root.
    pub public_key: String,
}

impl SignedNetworkParameters {
    /// Parse from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParamsError> {
        serde_json::from_slice(bytes).map_err(|e| ParamsError::Parse(e.to_string()))
    }

    /// Serialize to the on-disk JSON form.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, ParamsError> {
        serde_json::to_vec_pretty(self).map_err(|e| ParamsError::Serialize(e.to_string()))
    }

    /// Load from a parameters file.
    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let bytes = fs::read(path).map_err(|e| ParamsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }

    /// Write to a parameters file.
    pub fn save(&self, path: &Path) -> Result<(), ParamsError> {
        let bytes = self.to_json_pretty()?;
        fs::write(path, bytes).map_err(|e| ParamsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Errors reading, writing, or validating network parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// Malformed parameters file.
    #[error("malformed network parameters: {0}")]
    Parse(String),

    /// Serialization failure.
    #[error("failed to serialize network parameters: {0}")]
    Serialize(String),

    /// A field violates a structural invariant.
    #[error("invalid network parameters: {field}: {reason}")]
    InvalidField {
        /// Offending field name.
        field: &'static str,
        /// Why it is invalid.
        reason: String,
    },

    /// Filesystem failure.
    #[error("io error on {path}: {message}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error text.
        message: String,
    },
}
