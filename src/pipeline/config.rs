//! Pipeline configuration.

use std::time::Duration;

use crate::probe::DEFAULT_PROBE_TIMEOUT_SECS;
use crate::resolver::{AccessionTable, DoiResolverConfig};

/// Minimum allowed concurrency value.
pub(crate) const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub(crate) const MAX_CONCURRENCY: usize = 100;

/// Default number of in-flight network operations.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Everything needed to build a [`Pipeline`](super::Pipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on concurrent resolutions and probes (1-100).
    pub concurrency: usize,
    /// Per-probe timeout.
    pub probe_timeout: Duration,
    /// DOI endpoints and deadlines.
    pub doi: DoiResolverConfig,
    /// Accession prefix templates.
    pub accession_table: AccessionTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            doi: DoiResolverConfig::default(),
            accession_table: AccessionTable::default(),
        }
    }
}
