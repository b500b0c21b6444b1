//! Contract whitelist construction.
//!
//! Application archives are mapped to content-hash whitelist entries.
//! Entries only ever grow: hashes from previously bootstrapped
//! parameters are carried forward first, new hashes appended after.
//! Whether archives are also copied into node directories is a separate
//! concern handled by distribution.

use crate::artifact::ArtifactStore;
use crate::config::{APPS_DIR_NAME, APP_ARCHIVE_EXTENSION};
use crate::error::{BootstrapError, Result};
use crate::scan::NodeUnit;
use netforge_types::{Hash, Whitelist};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What one application archive contributes to the whitelist.
#[derive(Debug, Clone)]
pub struct AppManifest {
    /// Archive location.
    pub path: PathBuf,
    /// Fully-qualified contract names the archive provides.
    pub contract_names: Vec<String>,
    /// Content hash of the archive.
    pub hash: Hash,
}

/// Extracts an [`AppManifest`] from an application archive.
pub trait AppArchiveHasher {
    /// Inspect the archive at `path`.
    fn manifest(&self, path: &Path) -> Result<AppManifest>;
}

/// Default collaborator: the bundle file is named after the single
/// contract it provides, and the hash is SHA-256 over the bytes.
pub struct DefaultArchiveHasher;

impl AppArchiveHasher for DefaultArchiveHasher {
    fn manifest(&self, path: &Path) -> Result<AppManifest> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| BootstrapError::parse(path, "archive has no usable file name"))?;
        let bytes = ArtifactStore::read_bytes(path)?;
        Ok(AppManifest {
            path: path.to_path_buf(),
            contract_names: vec![stem.to_string()],
            hash: Hash::compute(&bytes),
        })
    }
}

/// Builds the contract whitelist for a bootstrap run.
pub struct ContractWhitelistBuilder;

impl ContractWhitelistBuilder {
    /// Archives to whitelist: the loose ones at the root plus any
    /// already distributed into node `apps/` directories by previous
    /// runs. Deduplicated by file name, loose copy preferred; sorted by
    /// file name.
    pub fn collect_archives(loose: &[PathBuf], units: &[NodeUnit]) -> Result<Vec<PathBuf>> {
        let mut by_name: BTreeMap<String, PathBuf> = BTreeMap::new();
        for archive in loose {
            if let Some(name) = archive.file_name().and_then(|n| n.to_str()) {
                by_name.insert(name.to_string(), archive.clone());
            }
        }
        for unit in units {
            let apps_dir = unit.dir.join(APPS_DIR_NAME);
            if !apps_dir.is_dir() {
                continue;
            }
            for entry in ArtifactStore::sorted_entries(&apps_dir)? {
                if !entry.is_file()
                    || !entry
                        .extension()
                        .is_some_and(|ext| ext == APP_ARCHIVE_EXTENSION)
                {
                    continue;
                }
                if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                    by_name.entry(name.to_string()).or_insert(entry.clone());
                }
            }
        }
        Ok(by_name.into_values().collect())
    }

    /// Hash every archive and union the results with the prior
    /// whitelist. Prior hashes keep their position; nothing is ever
    /// removed.
    pub fn build(
        archives: &[PathBuf],
        hasher: &dyn AppArchiveHasher,
        prior: Option<&Whitelist>,
    ) -> Result<Whitelist> {
        let mut whitelist = prior.cloned().unwrap_or_default();
        for archive in archives {
            let manifest = hasher.manifest(archive)?;
            debug!(
                "Archive {} provides {:?} with hash {}",
                manifest.path.display(),
                manifest.contract_names,
                manifest.hash
            );
            for name in &manifest.contract_names {
                let hashes = whitelist.entry(name.clone()).or_default();
                if !hashes.contains(&manifest.hash) {
                    hashes.push(manifest.hash);
                }
            }
        }
        Ok(whitelist)
    }
}
