//! Findable Core Library
//!
//! This library checks whether dataset identifiers (URLs, DOIs, repository
//! accessions) lead to a landing page that currently answers, and scores each
//! identifier as findable (1) or not (0).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`identifier`] - Input parsing and URL/DOI/accession classification
//! - [`resolver`] - Resolution strategies behind an extensible registry
//! - [`probe`] - Landing-page GET with redirects and a per-request timeout
//! - [`pipeline`] - Concurrent, order-preserving resolve-probe-score runs
//! - [`report`] - Table, summary and JSON renderings of results
//! - [`failure`] - Failure kinds retained in result records
//! - [`http_client`] - The shared HTTP client policy

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod failure;
pub mod http_client;
pub mod identifier;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod resolver;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use failure::{ErrorKind, FailureDescriptor};
pub use http_client::{HttpClientError, build_http_client};
pub use identifier::{
    ClassifiedIdentifier, IdentifierRecord, IdentifierType, ParseResult, classify,
    parse_identifier_args, parse_identifier_list,
};
pub use pipeline::{
    DEFAULT_CONCURRENCY, Pipeline, PipelineConfig, PipelineError, PipelineStats, ProbeOutcome,
    ResolutionOutcome, ResultRecord, findable_score,
};
pub use probe::{DEFAULT_PROBE_TIMEOUT_SECS, ProbeError, ProbeResponse, Prober};
pub use report::{ReportError, ReportFormat, write_failure_hints, write_report};
pub use resolver::{
    AccessionResolver, AccessionTable, DirectResolver, DoiResolver, DoiResolverConfig,
    ResolutionSource, ResolveError, ResolvedUrl, Resolver, ResolverRegistry,
    build_default_resolver_registry,
};
