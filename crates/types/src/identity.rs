//! Node identity documents.
//!
//! Each participant publishes a signed identity document: its legal name
//! plus its Ed25519 public key, countersigned by that same key. The
//! bootstrapper collects one document per node and distributes the full
//! set to every peer; it never inspects key material beyond parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public identity of one network participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Legal name, unique across the network.
    pub legal_name: String,

    /// Ed25519 public key, lowercase hex (64 chars).
    pub public_key: String,
}

impl NodeIdentity {
    /// Canonical byte encoding used as the signing payload.
    ///
    /// Field order is fixed by the struct definition, so the encoding is
    /// stable for a given identity.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        serde_json::to_vec(self).map_err(|e| IdentityError::Serialize(e.to_string()))
    }
}

/// A [`NodeIdentity`] plus the signature over its canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedNodeIdentity {
    /// The identity document.
    pub identity: NodeIdentity,

    /// Ed25519 signature over [`NodeIdentity::canonical_bytes`],
    /// lowercase hex (128 chars).
    pub signature: String,
}

impl SignedNodeIdentity {
    /// Parse from raw JSON bytes, as read from an identity file.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
        serde_json::from_slice(bytes).map_err(|e| IdentityError::Parse(e.to_string()))
    }

    /// Serialize to the on-disk JSON form.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, IdentityError> {
        serde_json::to_vec_pretty(self).map_err(|e| IdentityError::Serialize(e.to_string()))
    }
}

/// Errors reading or writing identity documents.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed identity file.
    #[error("malformed identity document: {0}")]
    Parse(String),

    /// Serialization failure.
    #[error("failed to serialize identity document: {0}")]
    Serialize(String),
}
