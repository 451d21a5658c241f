//! Pipeline orchestrator: classify, resolve, probe, score.
//!
//! # Overview
//!
//! [`Pipeline::run`] takes identifier records in input order and returns one
//! [`ResultRecord`] per record in the same order. Resolution and probing each
//! scatter one Tokio task per identifier and gather once; a semaphore caps
//! the number of tasks doing network work at any moment.
//!
//! Failures never abort the run. Every error lands in the affected record as
//! an [`ErrorKind`](crate::failure::ErrorKind) and scores 0.
//!
//! # Example
//!
//! ```no_run
//! use findable_core::identifier::IdentifierRecord;
//! use findable_core::pipeline::{Pipeline, PipelineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let records = vec![
//!     IdentifierRecord::new("10.5061/dryad.4j0zpc8p9"),
//!     IdentifierRecord::new("NC_045512"),
//! ];
//! for result in pipeline.run(records).await {
//!     println!("{}\t{}", result.identifier().raw_value(), result.findable_score());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod record;

pub use config::{DEFAULT_CONCURRENCY, PipelineConfig};
pub use record::{ProbeOutcome, ResolutionOutcome, ResultRecord, findable_score};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::failure::ErrorKind;
use crate::http_client::{HttpClientError, build_http_client};
use crate::identifier::{ClassifiedIdentifier, IdentifierRecord, IdentifierType, classify};
use crate::probe::Prober;
use crate::resolver::{ResolveError, ResolverRegistry, build_default_resolver_registry};

use config::{MAX_CONCURRENCY, MIN_CONCURRENCY};

/// Error type for building a pipeline. Running one never fails.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The shared HTTP client could not be built.
    #[error(transparent)]
    HttpClient(#[from] HttpClientError),

    /// A resolver rejected its configuration.
    #[error(transparent)]
    Resolver(#[from] ResolveError),
}

/// Live counters for a pipeline, readable while a run is in flight.
///
/// Counters accumulate across runs of the same pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    resolved: AtomicUsize,
    unresolved: AtomicUsize,
    probed: AtomicUsize,
    probe_failed: AtomicUsize,
    findable: AtomicUsize,
}

impl PipelineStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers that resolved to a URL.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Identifiers whose resolution failed.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.unresolved.load(Ordering::SeqCst)
    }

    /// Probes that received an HTTP response.
    #[must_use]
    pub fn probed(&self) -> usize {
        self.probed.load(Ordering::SeqCst)
    }

    /// Probes that ended in a timeout or transport error.
    #[must_use]
    pub fn probe_failed(&self) -> usize {
        self.probe_failed.load(Ordering::SeqCst)
    }

    /// Probes that answered 2xx.
    #[must_use]
    pub fn findable(&self) -> usize {
        self.findable.load(Ordering::SeqCst)
    }

    /// Identifiers with a final outcome: unresolved plus every finished probe.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.unresolved() + self.probed() + self.probe_failed()
    }

    fn record_resolution(&self, outcome: &ResolutionOutcome) {
        match outcome {
            ResolutionOutcome::Resolved(_) => self.resolved.fetch_add(1, Ordering::SeqCst),
            ResolutionOutcome::Failed { .. } => self.unresolved.fetch_add(1, Ordering::SeqCst),
        };
    }

    fn record_probe(&self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Completed(response) => {
                self.probed.fetch_add(1, Ordering::SeqCst);
                if findable_score(Some(response.status)) == 1 {
                    self.findable.fetch_add(1, Ordering::SeqCst);
                }
            }
            ProbeOutcome::Failed { .. } => {
                self.probe_failed.fetch_add(1, Ordering::SeqCst);
            }
            ProbeOutcome::Skipped => {}
        }
    }
}

/// Classifies, resolves, probes and scores identifier lists.
///
/// # Concurrency Model
///
/// - Each resolution and each probe runs in its own Tokio task
/// - A semaphore permit is held for every DOI resolution and every probe;
///   URL passthrough and accession lookups never wait for one
/// - Handles are awaited in spawn order, so output order equals input order
/// - A panicked task is recorded as a failure for that identifier only
#[derive(Debug)]
pub struct Pipeline {
    registry: Arc<ResolverRegistry>,
    prober: Arc<Prober>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    /// Builds a pipeline with the default resolvers on one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] outside 1-100,
    /// [`PipelineError::HttpClient`] if the client cannot be built and
    /// [`PipelineError::Resolver`] for invalid DOI settings.
    #[instrument(level = "debug", skip(config), fields(concurrency = config.concurrency))]
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        validate_concurrency(config.concurrency)?;
        let client = build_http_client()?;
        let registry =
            build_default_resolver_registry(client.clone(), config.accession_table, config.doi)?;
        let prober = Prober::with_timeout(client, config.probe_timeout);
        Self::with_components(registry, prober, config.concurrency)
    }

    /// Builds a pipeline from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConcurrency`] outside 1-100.
    pub fn with_components(
        registry: ResolverRegistry,
        prober: Prober,
        concurrency: usize,
    ) -> Result<Self, PipelineError> {
        validate_concurrency(concurrency)?;
        debug!(
            concurrency,
            resolvers = registry.resolver_count(),
            probe_timeout_ms = prober.timeout().as_millis(),
            "creating pipeline"
        );
        Ok(Self {
            registry: Arc::new(registry),
            prober: Arc::new(prober),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            stats: Arc::new(PipelineStats::new()),
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Shared handle to the live counters.
    #[must_use]
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Runs every record through the pipeline.
    ///
    /// Returns exactly one result per input record, in input order.
    #[instrument(skip(self, records), fields(total = records.len()))]
    pub async fn run(&self, records: Vec<IdentifierRecord>) -> Vec<ResultRecord> {
        info!("starting findability run");

        let identifiers: Vec<ClassifiedIdentifier> = records.into_iter().map(classify).collect();
        let resolutions = self.resolve_all(&identifiers).await;
        let probes = self.probe_all(&resolutions).await;

        let results: Vec<ResultRecord> = identifiers
            .into_iter()
            .zip(resolutions)
            .zip(probes)
            .map(|((identifier, resolution), probe)| {
                ResultRecord::new(identifier, resolution, probe)
            })
            .collect();

        let findable = results.iter().filter(|r| r.is_findable()).count();
        info!(
            total = results.len(),
            findable,
            not_findable = results.len() - findable,
            "findability run complete"
        );
        results
    }

    async fn resolve_all(&self, identifiers: &[ClassifiedIdentifier]) -> Vec<ResolutionOutcome> {
        let handles: Vec<JoinHandle<ResolutionOutcome>> = identifiers
            .iter()
            .map(|identifier| {
                let identifier = identifier.clone();
                let registry = Arc::clone(&self.registry);
                let semaphore = Arc::clone(&self.semaphore);
                let stats = Arc::clone(&self.stats);
                tokio::spawn(async move {
                    // Only DOI resolution touches the network.
                    let _permit = if needs_network(identifier.resolved_type) {
                        let Ok(permit) = semaphore.acquire_owned().await else {
                            return ResolutionOutcome::failed(
                                ErrorKind::ResolutionFailed,
                                "pipeline shut down before resolution",
                            );
                        };
                        Some(permit)
                    } else {
                        None
                    };
                    let outcome = ResolutionOutcome::from(registry.resolve(&identifier).await);
                    match &outcome {
                        ResolutionOutcome::Resolved(resolved) => debug!(
                            identifier = %identifier.raw_value(),
                            url = %resolved.url,
                            source = %resolved.source,
                            "identifier resolved"
                        ),
                        ResolutionOutcome::Failed { kind, message } => warn!(
                            identifier = %identifier.raw_value(),
                            error = %kind,
                            %message,
                            "resolution failed"
                        ),
                    }
                    stats.record_resolution(&outcome);
                    outcome
                })
            })
            .collect();

        debug!(task_count = handles.len(), "waiting for resolutions");

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "resolution task panicked");
                    let outcome = ResolutionOutcome::failed(
                        ErrorKind::ResolutionFailed,
                        format!("resolution task failed: {e}"),
                    );
                    self.stats.record_resolution(&outcome);
                    outcome
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn probe_all(&self, resolutions: &[ResolutionOutcome]) -> Vec<ProbeOutcome> {
        let handles: Vec<Option<JoinHandle<ProbeOutcome>>> = resolutions
            .iter()
            .map(|resolution| {
                let url = resolution.resolved_url()?.to_string();
                let prober = Arc::clone(&self.prober);
                let semaphore = Arc::clone(&self.semaphore);
                let stats = Arc::clone(&self.stats);
                Some(tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return ProbeOutcome::Failed {
                            kind: ErrorKind::TransportError,
                            message: "pipeline shut down before probing".to_string(),
                            elapsed: std::time::Duration::ZERO,
                        };
                    };
                    let outcome = ProbeOutcome::from(prober.probe(&url).await);
                    stats.record_probe(&outcome);
                    outcome
                }))
            })
            .collect();

        debug!(
            task_count = handles.iter().flatten().count(),
            "waiting for probes"
        );

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = match handle {
                None => ProbeOutcome::Skipped,
                Some(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "probe task panicked");
                        let outcome = ProbeOutcome::Failed {
                            kind: ErrorKind::TransportError,
                            message: format!("probe task failed: {e}"),
                            elapsed: std::time::Duration::ZERO,
                        };
                        self.stats.record_probe(&outcome);
                        outcome
                    }
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn needs_network(identifier_type: IdentifierType) -> bool {
    identifier_type == IdentifierType::Doi
}

fn validate_concurrency(value: usize) -> Result<(), PipelineError> {
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value) {
        Ok(())
    } else {
        Err(PipelineError::InvalidConcurrency { value })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::resolver::{
        AccessionResolver, AccessionTable, DirectResolver, ResolvedUrl, Resolver,
    };

    fn offline_pipeline(concurrency: usize) -> Pipeline {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(DirectResolver::new()));
        registry.register(Box::new(AccessionResolver::new(AccessionTable::default())));
        let prober = Prober::with_timeout(build_http_client().unwrap(), Duration::from_secs(1));
        Pipeline::with_components(registry, prober, concurrency).unwrap()
    }

    struct PanickingResolver;

    #[async_trait]
    impl Resolver for PanickingResolver {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn can_handle(&self, identifier_type: IdentifierType) -> bool {
            identifier_type == IdentifierType::Doi
        }

        async fn resolve(&self, _input: &str) -> Result<ResolvedUrl, ResolveError> {
            panic!("resolver bug");
        }
    }

    /// Signals or waits on a shared gate, then reports the input as unsupported.
    struct GatedResolver {
        handles: IdentifierType,
        gate: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl Resolver for GatedResolver {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn can_handle(&self, identifier_type: IdentifierType) -> bool {
            identifier_type == self.handles
        }

        async fn resolve(&self, input: &str) -> Result<ResolvedUrl, ResolveError> {
            if self.handles == IdentifierType::Doi {
                self.gate.notified().await;
            } else {
                self.gate.notify_one();
            }
            Err(ResolveError::unsupported(input))
        }
    }

    #[test]
    fn test_pipeline_rejects_zero_concurrency() {
        let result = Pipeline::new(PipelineConfig {
            concurrency: 0,
            ..PipelineConfig::default()
        });
        assert!(matches!(
            result,
            Err(PipelineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_pipeline_rejects_concurrency_above_max() {
        let result = Pipeline::new(PipelineConfig {
            concurrency: 101,
            ..PipelineConfig::default()
        });
        assert!(matches!(
            result,
            Err(PipelineError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_pipeline_accepts_bounds() {
        assert_eq!(offline_pipeline(1).concurrency(), 1);
        assert_eq!(offline_pipeline(100).concurrency(), 100);
    }

    #[test]
    fn test_invalid_concurrency_message() {
        let error = PipelineError::InvalidConcurrency { value: 0 };
        assert_eq!(
            error.to_string(),
            "invalid concurrency value 0: must be between 1 and 100"
        );
    }

    #[tokio::test]
    async fn test_run_empty_input_returns_empty() {
        let results = offline_pipeline(4).run(Vec::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_run_unsupported_accession_skips_probe() {
        let pipeline = offline_pipeline(4);
        let results = pipeline.run(vec![IdentifierRecord::new("ZZZ123")]).await;

        assert_eq!(results.len(), 1);
        let record = &results[0];
        assert_eq!(record.identifier().resolved_type, IdentifierType::Accession);
        assert_eq!(record.resolution().error(), Some(ErrorKind::Unsupported));
        assert_eq!(record.probe(), &ProbeOutcome::Skipped);
        assert_eq!(record.probe().elapsed(), Duration::ZERO);
        assert_eq!(record.findable_score(), 0);

        let stats = pipeline.stats();
        assert_eq!(stats.unresolved(), 1);
        assert_eq!(stats.finished(), 1);
    }

    #[tokio::test]
    async fn test_run_missing_resolver_is_unsupported() {
        let results = offline_pipeline(4)
            .run(vec![IdentifierRecord::new("10.1234/no-doi-resolver")])
            .await;
        assert_eq!(results[0].resolution().error(), Some(ErrorKind::Unsupported));
        assert_eq!(results[0].probe().error(), Some(ErrorKind::SkippedNoUrl));
    }

    #[tokio::test]
    async fn test_run_invalid_url_is_transport_error() {
        let results = offline_pipeline(4)
            .run(vec![IdentifierRecord::new("not a url").with_declared_type(IdentifierType::Url)])
            .await;
        assert!(results[0].resolution().resolved_url().is_some());
        assert_eq!(results[0].probe().error(), Some(ErrorKind::TransportError));
        assert_eq!(results[0].findable_score(), 0);
    }

    #[tokio::test]
    async fn test_run_panicking_resolver_fails_only_its_identifier() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(AccessionResolver::new(AccessionTable::default())));
        registry.register(Box::new(PanickingResolver));
        let prober = Prober::with_timeout(build_http_client().unwrap(), Duration::from_secs(1));
        let pipeline = Pipeline::with_components(registry, prober, 2).unwrap();

        let results = pipeline
            .run(vec![
                IdentifierRecord::new("10.1234/boom"),
                IdentifierRecord::new("ZZZ123"),
            ])
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].identifier().raw_value(), "10.1234/boom");
        assert_eq!(
            results[0].resolution().error(),
            Some(ErrorKind::ResolutionFailed)
        );
        assert_eq!(results[1].identifier().raw_value(), "ZZZ123");
        assert_eq!(results[1].resolution().error(), Some(ErrorKind::Unsupported));
        assert_eq!(pipeline.stats().unresolved(), 2);
    }

    #[tokio::test]
    async fn test_run_accession_lookup_does_not_wait_for_doi_permit() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(GatedResolver {
            handles: IdentifierType::Doi,
            gate: Arc::clone(&gate),
        }));
        registry.register(Box::new(GatedResolver {
            handles: IdentifierType::Accession,
            gate,
        }));
        let prober = Prober::with_timeout(build_http_client().unwrap(), Duration::from_secs(1));
        let pipeline = Pipeline::with_components(registry, prober, 1).unwrap();

        // The DOI task holds the only permit until the accession lookup runs.
        let results = tokio::time::timeout(
            Duration::from_secs(2),
            pipeline.run(vec![
                IdentifierRecord::new("10.1234/held"),
                IdentifierRecord::new("ZZZ123"),
            ]),
        )
        .await
        .expect("accession lookup queued behind the DOI permit");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].identifier().raw_value(), "10.1234/held");
        assert_eq!(results[1].identifier().raw_value(), "ZZZ123");
    }

    #[test]
    fn test_stats_finished_counts_terminal_outcomes() {
        let stats = PipelineStats::new();
        stats.record_resolution(&ResolutionOutcome::failed(ErrorKind::Unsupported, "x"));
        stats.record_probe(&ProbeOutcome::Failed {
            kind: ErrorKind::Timeout,
            message: "slow".to_string(),
            elapsed: Duration::from_secs(1),
        });
        stats.record_probe(&ProbeOutcome::Skipped);
        assert_eq!(stats.unresolved(), 1);
        assert_eq!(stats.probe_failed(), 1);
        assert_eq!(stats.finished(), 2);
        assert_eq!(stats.findable(), 0);
    }
}
