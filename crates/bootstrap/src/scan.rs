//! Topology scanning and validation.
//!
//! Classifies the immediate children of the root directory into node
//! units and loose artifacts. The only mutation here is the
//! directory-normalization pass, which relocates loose `<name>_node.conf`
//! files into their own node directories; everything after it is
//! read-only until the whole topology has validated.

use crate::artifact::ArtifactStore;
use crate::config::{
    ConfigParser, NodeConf, APP_ARCHIVE_EXTENSION, NODE_BINARY_FILE_NAME, NODE_CONF_FILE_NAME,
    NODE_CONF_SUFFIX,
};
use crate::error::{BootstrapError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One discovered participant: its directory and parsed configuration.
#[derive(Debug, Clone)]
pub struct NodeUnit {
    /// Node directory under the root.
    pub dir: PathBuf,
    /// Directory name.
    pub name: String,
    /// Parsed `node.conf`.
    pub conf: NodeConf,
}

/// Result of scanning a root directory.
#[derive(Debug)]
pub struct Topology {
    /// Node units, sorted by directory name.
    pub units: Vec<NodeUnit>,
    /// Platform binary found loose at the root, if any.
    pub loose_binary: Option<PathBuf>,
    /// Application archives found loose at the root, sorted.
    pub loose_archives: Vec<PathBuf>,
}

/// Classifies a root directory into node units and loose artifacts.
pub struct TopologyScanner;

impl TopologyScanner {
    /// Directory-normalization pass: each loose `<name>_node.conf` file
    /// at the root is moved into a (possibly fresh) `<name>` directory
    /// as `node.conf`.
    ///
    /// This is the only write permitted before validation completes and
    /// it preserves file content byte for byte.
    pub fn normalize(root: &Path) -> Result<()> {
        for entry in ArtifactStore::sorted_entries(root)? {
            if !entry.is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = file_name.strip_suffix(NODE_CONF_SUFFIX) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let node_dir = root.join(name);
            ArtifactStore::ensure_dir(&node_dir)?;
            ArtifactStore::move_file(&entry, &node_dir.join(NODE_CONF_FILE_NAME))?;
            debug!("Relocated {} into {}", file_name, node_dir.display());
        }
        Ok(())
    }

    /// Normalize, classify, parse, and validate the root directory.
    ///
    /// Fails without further mutation when a node directory lacks a
    /// `node.conf`, when no node units exist, or when two units share a
    /// legal name.
    pub fn scan(root: &Path, parser: &dyn ConfigParser) -> Result<Topology> {
        Self::normalize(root)?;

        let mut node_dirs = Vec::new();
        let mut loose_binary = None;
        let mut loose_archives = Vec::new();

        for entry in ArtifactStore::sorted_entries(root)? {
            let Some(file_name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if entry.is_dir() {
                if !entry.join(NODE_CONF_FILE_NAME).is_file() {
                    return Err(BootstrapError::MissingNodeConf(file_name.to_string()));
                }
                node_dirs.push((entry.clone(), file_name.to_string()));
            } else if file_name == NODE_BINARY_FILE_NAME {
                loose_binary = Some(entry.clone());
            } else if entry
                .extension()
                .is_some_and(|ext| ext == APP_ARCHIVE_EXTENSION)
            {
                loose_archives.push(entry.clone());
            }
            // Anything else at the top level is not ours to interpret.
        }

        if node_dirs.is_empty() {
            return Err(BootstrapError::NoNodesFound);
        }

        let mut units = Vec::with_capacity(node_dirs.len());
        for (dir, name) in node_dirs {
            let conf = parser.parse(&dir.join(NODE_CONF_FILE_NAME))?;
            debug!("Node {} has legal name {}", name, conf.legal_name);
            units.push(NodeUnit { dir, name, conf });
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for unit in &units {
            *seen.entry(unit.conf.legal_name.as_str()).or_default() += 1;
        }
        if let Some((name, _)) = seen.iter().find(|(_, count)| **count > 1) {
            return Err(BootstrapError::DuplicateLegalName(name.to_string()));
        }

        Ok(Topology {
            units,
            loose_binary,
            loose_archives,
        })
    }
}
