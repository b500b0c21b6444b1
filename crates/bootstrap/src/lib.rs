//! Netforge network bootstrapper.
//!
//! Turns a flat directory of per-node configuration files and
//! application bundles into a mutually consistent permissioned network:
//! every node directory ends up with the same signed network
//! parameters, the same platform binary, the same whitelisted
//! application hashes, and a full copy of every peer's identity.
//!
//! The run is a single pass:
//!
//! ```text
//! scan -> validate -> collect identities -> build whitelist
//!      -> reconcile parameters -> distribute
//! ```
//!
//! All consistency checks complete before anything beyond conf-file
//! relocation is written; re-running with unchanged inputs is a no-op.

pub mod artifact;
pub mod config;
pub mod distribute;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod scan;
pub mod whitelist;

pub use artifact::ArtifactStore;
pub use config::{
    ConfigParser, JsonConfigParser, NodeConf, NotaryConf, APPS_DIR_NAME, APP_ARCHIVE_EXTENSION,
    IDENTITY_FILE_PREFIX, NETWORK_PARAMS_FILE_NAME, NODE_BINARY_FILE_NAME, NODE_CONF_FILE_NAME,
    NODE_CONF_SUFFIX, NODE_KEY_FILE_NAME, PEER_IDENTITIES_DIR_NAME,
};
pub use distribute::Distributor;
pub use error::{BootstrapError, Result};
pub use identity::{
    DefaultIdentityGenerator, IdentityCollector, IdentityGenerator, NodeIdentityRecord,
    NodeKeyFile,
};
pub use reconcile::NetworkParametersReconciler;
pub use scan::{NodeUnit, Topology, TopologyScanner};
pub use whitelist::{AppArchiveHasher, AppManifest, ContractWhitelistBuilder, DefaultArchiveHasher};

use netforge_crypto::TrustRoot;
use netforge_types::NetworkParameters;
use std::path::Path;
use tracing::info;

/// Default platform binary, packaged with the tool.
///
/// Release packaging replaces the stub under `embedded/` with the real
/// `netforge-node` executable.
const EMBEDDED_NODE_BINARY: &[u8] = include_bytes!("../embedded/netforge-node");

/// Supplies the default platform binary when the root directory does
/// not provide one.
pub trait PlatformBinarySource {
    /// The binary bytes.
    fn bytes(&self) -> Result<Vec<u8>>;
}

/// Default source: the binary embedded in this executable.
pub struct EmbeddedBinarySource;

impl PlatformBinarySource for EmbeddedBinarySource {
    fn bytes(&self) -> Result<Vec<u8>> {
        Ok(EMBEDDED_NODE_BINARY.to_vec())
    }
}

/// Toggles for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Copy application archives into node `apps/` directories.
    /// Whitelisting happens either way.
    pub copy_apps: bool,
    /// Use the embedded platform binary even when the root directory
    /// provides one.
    pub prefer_embedded_binary: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            copy_apps: true,
            prefer_embedded_binary: false,
        }
    }
}

/// Outcome of a successful bootstrap run.
#[derive(Debug)]
pub struct BootstrapReport {
    /// The canonical parameter set now installed in every node.
    pub parameters: NetworkParameters,
    /// Number of node units bootstrapped.
    pub nodes: usize,
}

/// The bootstrap engine.
///
/// Owns its collaborators; [`Bootstrapper::new`] wires the production
/// defaults, [`Bootstrapper::with_collaborators`] lets tests substitute
/// deterministic fakes.
pub struct Bootstrapper {
    config_parser: Box<dyn ConfigParser>,
    identity_generator: Box<dyn IdentityGenerator>,
    binary_source: Box<dyn PlatformBinarySource>,
    archive_hasher: Box<dyn AppArchiveHasher>,
    trust_root: TrustRoot,
}

impl Bootstrapper {
    /// Engine with production collaborators and the development trust
    /// root.
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(JsonConfigParser),
            Box::new(DefaultIdentityGenerator::new()),
            Box::new(EmbeddedBinarySource),
            Box::new(DefaultArchiveHasher),
            TrustRoot::dev(),
        )
    }

    /// Engine with explicit collaborators.
    pub fn with_collaborators(
        config_parser: Box<dyn ConfigParser>,
        identity_generator: Box<dyn IdentityGenerator>,
        binary_source: Box<dyn PlatformBinarySource>,
        archive_hasher: Box<dyn AppArchiveHasher>,
        trust_root: TrustRoot,
    ) -> Self {
        Self {
            config_parser,
            identity_generator,
            binary_source,
            archive_hasher,
            trust_root,
        }
    }

    /// Bootstrap the network rooted at `root`.
    pub fn bootstrap(&self, root: &Path, options: &BootstrapOptions) -> Result<BootstrapReport> {
        info!("Scanning {}", root.display());
        let topology = TopologyScanner::scan(root, self.config_parser.as_ref())?;
        info!("Found {} node(s)", topology.units.len());

        // Prior parameters are read and verified before the first
        // post-validation write, so a bad signature aborts with node
        // directories untouched.
        let prior = NetworkParametersReconciler::find_prior(&topology.units)?;
        let prior_params = match &prior {
            Some((path, signed)) => {
                let params = self.trust_root.verify(signed).map_err(|e| {
                    BootstrapError::SignatureVerification {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                })?;
                params
                    .validate()
                    .map_err(|e| BootstrapError::parse(path, e.to_string()))?;
                Some(params)
            }
            None => None,
        };

        let binary = self.resolve_binary(&topology, options)?;

        info!("Collecting node identities");
        let identities = IdentityCollector::new(self.identity_generator.as_ref())
            .collect(&topology.units, &binary)?;

        info!("Building contract whitelist");
        let archives =
            ContractWhitelistBuilder::collect_archives(&topology.loose_archives, &topology.units)?;
        let whitelist = ContractWhitelistBuilder::build(
            &archives,
            self.archive_hasher.as_ref(),
            prior_params.as_ref().map(|p| &p.whitelist),
        )?;

        let notaries = NetworkParametersReconciler::notary_records(&topology.units, &identities);
        let modified_time = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let parameters = NetworkParametersReconciler::reconcile(
            prior_params.as_ref(),
            notaries,
            whitelist,
            modified_time,
        );
        let signed = self
            .trust_root
            .sign_parameters(parameters.clone())
            .map_err(|e| BootstrapError::SignatureVerification {
                path: root.join(NETWORK_PARAMS_FILE_NAME),
                message: e.to_string(),
            })?;

        info!("Distributing artifacts to {} node(s)", topology.units.len());
        Distributor {
            copy_apps: options.copy_apps,
        }
        .distribute(&topology.units, &binary, &archives, &signed, &identities)?;

        info!(
            "Bootstrap complete: epoch {}, {} notary(ies), {} whitelisted contract(s)",
            parameters.epoch,
            parameters.notaries.len(),
            parameters.whitelist.len()
        );
        Ok(BootstrapReport {
            parameters,
            nodes: topology.units.len(),
        })
    }

    fn resolve_binary(&self, topology: &Topology, options: &BootstrapOptions) -> Result<Vec<u8>> {
        if options.prefer_embedded_binary {
            return self.binary_source.bytes();
        }
        match &topology.loose_binary {
            Some(path) => ArtifactStore::read_bytes(path),
            None => self.binary_source.bytes(),
        }
    }
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new()
    }
}
