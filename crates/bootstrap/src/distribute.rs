//! Artifact distribution.
//!
//! Writes the agreed artifacts into every node directory: the platform
//! binary, the application archives, the signed network parameters, and
//! the full peer identity set. Every write is content-compared first,
//! so a re-run with unchanged inputs rewrites nothing and a crashed run
//! is safe to retry.

use crate::artifact::ArtifactStore;
use crate::config::{
    APPS_DIR_NAME, NETWORK_PARAMS_FILE_NAME, NODE_BINARY_FILE_NAME, PEER_IDENTITIES_DIR_NAME,
};
use crate::error::{BootstrapError, Result};
use crate::identity::NodeIdentityRecord;
use crate::scan::NodeUnit;
use netforge_types::SignedNetworkParameters;
use std::path::PathBuf;
use tracing::debug;

/// Distributes bootstrap artifacts into node directories.
pub struct Distributor {
    /// When false, application archives are hashed and whitelisted but
    /// never copied into node `apps/` directories.
    pub copy_apps: bool,
}

impl Distributor {
    /// Write everything into every node directory, idempotently.
    pub fn distribute(
        &self,
        units: &[NodeUnit],
        binary: &[u8],
        archives: &[PathBuf],
        signed: &SignedNetworkParameters,
        identities: &[NodeIdentityRecord],
    ) -> Result<()> {
        let params_bytes = signed
            .to_json_pretty()
            .map_err(|e| BootstrapError::parse(&PathBuf::from(NETWORK_PARAMS_FILE_NAME), e.to_string()))?;

        for unit in units {
            if ArtifactStore::write_if_changed(&unit.dir.join(NODE_BINARY_FILE_NAME), binary)? {
                debug!("Updated platform binary in {}", unit.dir.display());
            }

            if self.copy_apps {
                let apps_dir = unit.dir.join(APPS_DIR_NAME);
                ArtifactStore::ensure_dir(&apps_dir)?;
                for archive in archives {
                    let Some(name) = archive.file_name() else {
                        continue;
                    };
                    ArtifactStore::copy_if_changed(archive, &apps_dir.join(name))?;
                }
            }

            ArtifactStore::write_if_changed(
                &unit.dir.join(NETWORK_PARAMS_FILE_NAME),
                &params_bytes,
            )?;

            let peers_dir = unit.dir.join(PEER_IDENTITIES_DIR_NAME);
            ArtifactStore::ensure_dir(&peers_dir)?;
            for record in identities {
                ArtifactStore::write_if_changed(
                    &peers_dir.join(&record.file_name),
                    &record.bytes,
                )?;
            }
        }
        Ok(())
    }
}
