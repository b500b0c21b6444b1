//! Identity collection.
//!
//! Every node unit contributes one signed identity document. Producing
//! the document is the identity generator collaborator's job; this
//! module drives it per unit, makes sure each unit has a platform
//! binary first, and reads the results back as [`NodeIdentityRecord`]s
//! for reconciliation and distribution.
//!
//! The default generator self-signs a fresh Ed25519 identity, or reuses
//! the identity file already present in the node directory when its
//! legal name still matches. Within one run it is referentially
//! idempotent per legal name.

use crate::artifact::ArtifactStore;
use crate::config::{
    ConfigParser, JsonConfigParser, IDENTITY_FILE_PREFIX, NODE_BINARY_FILE_NAME,
    NODE_CONF_FILE_NAME, NODE_KEY_FILE_NAME,
};
use crate::error::{BootstrapError, Result};
use crate::scan::NodeUnit;
use netforge_crypto::KeyPair;
use netforge_types::{Hash, NodeIdentity, SignedNodeIdentity};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One node's collected identity, as read from its identity file.
#[derive(Debug, Clone)]
pub struct NodeIdentityRecord {
    /// Legal name of the owning node.
    pub legal_name: String,
    /// The parsed signed identity document.
    pub identity: SignedNodeIdentity,
    /// File name the identity was read from (`identity-<hash>`).
    pub file_name: String,
    /// Raw file bytes, distributed verbatim to every peer.
    pub bytes: Vec<u8>,
}

/// Produces a signed identity file for a node directory.
///
/// Implementations must be referentially idempotent per legal name
/// within one process run, and should reuse a previously generated
/// identity when nothing material changed; the engine never forces
/// regeneration.
pub trait IdentityGenerator {
    /// Ensure `node_dir` holds a signed identity file and return its path.
    fn generate(&self, node_dir: &Path) -> Result<PathBuf>;
}

/// Key material written next to a freshly generated identity so the
/// node can sign as itself later.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeKeyFile {
    /// Legal name the key belongs to.
    pub legal_name: String,
    /// Ed25519 public key, lowercase hex.
    pub public_key: String,
    /// Ed25519 secret key seed, lowercase hex.
    pub secret_key: String,
}

/// Default generator: self-signed Ed25519 identities.
pub struct DefaultIdentityGenerator {
    generated: Mutex<HashMap<String, PathBuf>>,
}

impl DefaultIdentityGenerator {
    /// Create a generator with an empty per-run cache.
    pub fn new() -> Self {
        Self {
            generated: Mutex::new(HashMap::new()),
        }
    }

    fn existing_identity(node_dir: &Path, legal_name: &str) -> Result<Option<PathBuf>> {
        for entry in ArtifactStore::sorted_entries(node_dir)? {
            let Some(file_name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !entry.is_file() || !file_name.starts_with(IDENTITY_FILE_PREFIX) {
                continue;
            }
            let bytes = ArtifactStore::read_bytes(&entry)?;
            if let Ok(signed) = SignedNodeIdentity::from_slice(&bytes) {
                if signed.identity.legal_name == legal_name {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }
}

impl Default for DefaultIdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGenerator for DefaultIdentityGenerator {
    fn generate(&self, node_dir: &Path) -> Result<PathBuf> {
        let conf_path = node_dir.join(NODE_CONF_FILE_NAME);
        let conf = JsonConfigParser.parse(&conf_path)?;

        if let Some(path) = self.generated.lock().get(&conf.legal_name) {
            return Ok(path.clone());
        }

        // A previous run's identity stays valid as long as the legal
        // name is unchanged.
        if let Some(path) = Self::existing_identity(node_dir, &conf.legal_name)? {
            debug!(
                "Reusing identity file {} for {}",
                path.display(),
                conf.legal_name
            );
            self.generated
                .lock()
                .insert(conf.legal_name.clone(), path.clone());
            return Ok(path);
        }

        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let identity = NodeIdentity {
            legal_name: conf.legal_name.clone(),
            public_key: keypair.public_key.to_hex(),
        };
        let payload = identity
            .canonical_bytes()
            .map_err(|e| BootstrapError::parse(&conf_path, e.to_string()))?;
        let signed = SignedNodeIdentity {
            identity,
            signature: keypair.sign(&payload).to_hex(),
        };
        let bytes = signed
            .to_json_pretty()
            .map_err(|e| BootstrapError::parse(&conf_path, e.to_string()))?;

        let file_name = format!("{}{}", IDENTITY_FILE_PREFIX, Hash::compute(&bytes));
        let path = node_dir.join(&file_name);
        ArtifactStore::write_bytes(&path, &bytes)?;

        let key_file = NodeKeyFile {
            legal_name: conf.legal_name.clone(),
            public_key: keypair.public_key.to_hex(),
            secret_key: keypair.secret_key.to_hex(),
        };
        let key_path = node_dir.join(NODE_KEY_FILE_NAME);
        let key_bytes = serde_json::to_vec_pretty(&key_file)
            .map_err(|e| BootstrapError::parse(&key_path, e.to_string()))?;
        ArtifactStore::write_bytes(&key_path, &key_bytes)?;

        debug!("Generated identity {} for {}", file_name, conf.legal_name);
        self.generated
            .lock()
            .insert(conf.legal_name.clone(), path.clone());
        Ok(path)
    }
}

/// Drives identity generation across all validated node units.
pub struct IdentityCollector<'a> {
    generator: &'a dyn IdentityGenerator,
}

impl<'a> IdentityCollector<'a> {
    /// Wrap an identity generator collaborator.
    pub fn new(generator: &'a dyn IdentityGenerator) -> Self {
        Self { generator }
    }

    /// Ensure each unit has the platform binary, then collect one
    /// identity record per unit, in unit order.
    pub fn collect(&self, units: &[NodeUnit], binary: &[u8]) -> Result<Vec<NodeIdentityRecord>> {
        let mut records = Vec::with_capacity(units.len());
        for unit in units {
            let binary_path = unit.dir.join(NODE_BINARY_FILE_NAME);
            if ArtifactStore::write_if_changed(&binary_path, binary)? {
                debug!("Installed platform binary into {}", unit.dir.display());
            }

            let path = self.generator.generate(&unit.dir)?;
            let bytes = ArtifactStore::read_bytes(&path)?;
            let identity = SignedNodeIdentity::from_slice(&bytes)
                .map_err(|e| BootstrapError::parse(&path, e.to_string()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| BootstrapError::parse(&path, "identity file has no name"))?
                .to_string();
            records.push(NodeIdentityRecord {
                legal_name: identity.identity.legal_name.clone(),
                identity,
                file_name,
                bytes,
            });
        }
        Ok(records)
    }
}
