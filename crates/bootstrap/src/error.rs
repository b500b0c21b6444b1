//! Bootstrap error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while bootstrapping a network.
///
/// Classification and validation failures (`NoNodesFound`,
/// `MissingNodeConf`, `DuplicateLegalName`, `ConfigParse`) occur before
/// anything beyond conf-file relocation has been written.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The root directory contains no node units
    #[error("No nodes found")]
    NoNodesFound,

    /// A node directory has no configuration file
    #[error("Missing node.conf in node directory {0}")]
    MissingNodeConf(String),

    /// Two or more node units share a legal name
    #[error("Nodes must have unique legal names: {0}")]
    DuplicateLegalName(String),

    /// A configuration or parameters file could not be parsed
    #[error("failed to parse {path}: {message}")]
    ConfigParse {
        /// Offending file
        path: PathBuf,
        /// Parser error text
        message: String,
    },

    /// An existing parameters file is not signed by the trust root
    #[error("network parameters signature verification failed for {path}: {message}")]
    SignatureVerification {
        /// Offending parameters file
        path: PathBuf,
        /// Verifier error text
        message: String,
    },

    /// Filesystem failure
    #[error("io error on {path}: {message}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error text
        message: String,
    },
}

impl BootstrapError {
    /// Wrap an `std::io::Error` with the path it occurred on.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Wrap a parse failure with the file it came from.
    pub fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result type for bootstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;
