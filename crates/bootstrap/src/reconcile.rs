//! Network parameters reconciliation.
//!
//! Merges previously bootstrapped parameters with the freshly observed
//! notary set and whitelist. The epoch only moves when content moved:
//! an unchanged topology reproduces the prior record exactly, so the
//! re-signed file is byte-identical and a re-run is a no-op.

use crate::artifact::ArtifactStore;
use crate::config::NETWORK_PARAMS_FILE_NAME;
use crate::error::{BootstrapError, Result};
use crate::identity::NodeIdentityRecord;
use crate::scan::NodeUnit;
use netforge_types::{
    NetworkParameters, NotaryRecord, SignedNetworkParameters, Whitelist,
    DEFAULT_EVENT_HORIZON_MS, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_TRANSACTION_SIZE,
    DEFAULT_MIN_PLATFORM_VERSION,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Derives the canonical parameter set for this bootstrap run.
pub struct NetworkParametersReconciler;

impl NetworkParametersReconciler {
    /// Build notary records from the units whose configuration declares
    /// a notary section, sorted by legal name.
    ///
    /// `identities` must hold one record per unit in unit order, as
    /// produced by identity collection.
    pub fn notary_records(
        units: &[NodeUnit],
        identities: &[NodeIdentityRecord],
    ) -> Vec<NotaryRecord> {
        debug_assert_eq!(units.len(), identities.len());
        let mut notaries: Vec<NotaryRecord> = units
            .iter()
            .zip(identities)
            .filter_map(|(unit, record)| {
                unit.conf.notary.as_ref().map(|notary| NotaryRecord {
                    identity: record.identity.identity.clone(),
                    validating: notary.validating,
                })
            })
            .collect();
        notaries.sort_by(|a, b| a.identity.legal_name.cmp(&b.identity.legal_name));
        notaries
    }

    /// Locate the most recent prior signed parameters among the node
    /// directories. All copies are invariant-equal, so the first one in
    /// sorted unit order suffices.
    pub fn find_prior(units: &[NodeUnit]) -> Result<Option<(PathBuf, SignedNetworkParameters)>> {
        for unit in units {
            let path = unit.dir.join(NETWORK_PARAMS_FILE_NAME);
            if !path.is_file() {
                continue;
            }
            let bytes = ArtifactStore::read_bytes(&path)?;
            let signed = SignedNetworkParameters::from_slice(&bytes)
                .map_err(|e| BootstrapError::parse(&path, e.to_string()))?;
            debug!("Found prior network parameters at {}", path.display());
            return Ok(Some((path, signed)));
        }
        Ok(None)
    }

    /// Decide the canonical parameter set.
    ///
    /// - No prior record: epoch 1, process defaults, `modified_time`.
    /// - Prior record equal to the candidate (prior with only notaries
    ///   and whitelist replaced): the prior record verbatim.
    /// - Otherwise: the candidate with the epoch bumped by one and a
    ///   fresh `modified_time`.
    pub fn reconcile(
        prior: Option<&NetworkParameters>,
        notaries: Vec<NotaryRecord>,
        whitelist: Whitelist,
        modified_time: String,
    ) -> NetworkParameters {
        match prior {
            None => NetworkParameters {
                min_platform_version: DEFAULT_MIN_PLATFORM_VERSION,
                notaries,
                max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
                max_transaction_size: DEFAULT_MAX_TRANSACTION_SIZE,
                whitelist,
                event_horizon_ms: DEFAULT_EVENT_HORIZON_MS,
                epoch: 1,
                modified_time,
            },
            Some(prev) => {
                let candidate = NetworkParameters {
                    notaries,
                    whitelist,
                    ..prev.clone()
                };
                if candidate == *prev {
                    info!("Network parameters unchanged, keeping epoch {}", prev.epoch);
                    prev.clone()
                } else {
                    info!(
                        "Network parameters changed, bumping epoch {} -> {}",
                        prev.epoch,
                        prev.epoch + 1
                    );
                    NetworkParameters {
                        epoch: prev.epoch + 1,
                        modified_time,
                        ..candidate
                    }
                }
            }
        }
    }
}
