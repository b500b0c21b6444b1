//! Node configuration
//!
//! Each node unit carries a `node.conf` JSON document with its legal
//! name and an optional notary section. Parsing is a collaborator
//! concern behind [`ConfigParser`] so tests can substitute their own;
//! the default parses JSON via serde. This module also fixes the
//! on-disk names the bootstrapper recognises.

use crate::error::{BootstrapError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration file name inside a node directory.
pub const NODE_CONF_FILE_NAME: &str = "node.conf";

/// Suffix marking a loose conf file at the root, `<name>_node.conf`.
pub const NODE_CONF_SUFFIX: &str = "_node.conf";

/// Platform binary name, at the root (distribution source) and inside
/// each node directory.
pub const NODE_BINARY_FILE_NAME: &str = "netforge-node";

/// Application archive extension.
pub const APP_ARCHIVE_EXTENSION: &str = "wasm";

/// Application bundle directory inside a node directory.
pub const APPS_DIR_NAME: &str = "apps";

/// Signed network parameters file name inside a node directory.
pub const NETWORK_PARAMS_FILE_NAME: &str = "network-parameters.json";

/// Peer identity directory inside a node directory.
pub const PEER_IDENTITIES_DIR_NAME: &str = "peer-identities";

/// Identity file prefix; the suffix is the hex content hash of the file.
pub const IDENTITY_FILE_PREFIX: &str = "identity-";

/// Key file written next to a freshly generated identity.
pub const NODE_KEY_FILE_NAME: &str = "node-key.json";

/// Notary section of a node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryConf {
    /// Whether this notary validates transaction contents.
    #[serde(default)]
    pub validating: bool,
}

/// Parsed node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConf {
    /// Legal name, unique across the network.
    pub legal_name: String,

    /// Present when the node offers a notary service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notary: Option<NotaryConf>,
}

/// Parses a node configuration file into a [`NodeConf`].
pub trait ConfigParser {
    /// Parse the file at `path`. Malformed input is a
    /// [`BootstrapError::ConfigParse`].
    fn parse(&self, path: &Path) -> Result<NodeConf>;
}

/// Default parser: `node.conf` holds a JSON document.
pub struct JsonConfigParser;

impl ConfigParser for JsonConfigParser {
    fn parse(&self, path: &Path) -> Result<NodeConf> {
        let bytes = fs::read(path).map_err(|e| BootstrapError::io(path, e))?;
        let conf: NodeConf =
            serde_json::from_slice(&bytes).map_err(|e| BootstrapError::parse(path, e.to_string()))?;
        if conf.legal_name.trim().is_empty() {
            return Err(BootstrapError::parse(path, "legal_name must not be empty"));
        }
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse_str(content: &str) -> Result<NodeConf> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        JsonConfigParser.parse(file.path())
    }

    #[test]
    fn test_parse_plain_node() {
        let conf = parse_str(r#"{ "legal_name": "Alice Corp" }"#).unwrap();
        assert_eq!(conf.legal_name, "Alice Corp");
        assert!(conf.notary.is_none());
    }

    #[test]
    fn test_parse_validating_notary() {
        let conf =
            parse_str(r#"{ "legal_name": "Notary", "notary": { "validating": true } }"#).unwrap();
        assert_eq!(conf.notary, Some(NotaryConf { validating: true }));
    }

    #[test]
    fn test_notary_validating_defaults_to_false() {
        let conf = parse_str(r#"{ "legal_name": "Notary", "notary": {} }"#).unwrap();
        assert_eq!(conf.notary, Some(NotaryConf { validating: false }));
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        let err = parse_str("{ not json").unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigParse { .. }));
    }

    #[test]
    fn test_empty_legal_name_rejected() {
        let err = parse_str(r#"{ "legal_name": "  " }"#).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonConfigParser
            .parse(Path::new("/nonexistent/node.conf"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Io { .. }));
    }
}
