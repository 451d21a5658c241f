//! Identifier resolution: turning a classified identifier into a landing-page URL.
//!
//! # Architecture
//!
//! - [`Resolver`] - Async trait that individual strategies implement
//! - [`ResolverRegistry`] - Dispatches an identifier to the resolver for its type
//! - [`DirectResolver`] - URL passthrough
//! - [`AccessionResolver`] - Longest-prefix match against an [`AccessionTable`]
//! - [`DoiResolver`] - Crossref metadata lookup with `doi.org` fallback
//!
//! # Example
//!
//! ```no_run
//! use findable_core::build_http_client;
//! use findable_core::identifier::{IdentifierRecord, classify};
//! use findable_core::resolver::{AccessionTable, DoiResolverConfig, build_default_resolver_registry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client()?;
//! let registry = build_default_resolver_registry(
//!     client,
//!     AccessionTable::default(),
//!     DoiResolverConfig::default(),
//! )?;
//!
//! let identifier = classify(IdentifierRecord::new("10.5061/dryad.4j0zpc8p9"));
//! let resolved = registry.resolve(&identifier).await?;
//! println!("Resolved URL: {}", resolved.url);
//! # Ok(())
//! # }
//! ```

mod accession;
mod direct;
mod doi;
mod error;
mod registry;

pub use accession::{ACCESSION_PLACEHOLDER, AccessionResolver, AccessionTable, AccessionTableError};
pub use direct::DirectResolver;
pub use doi::{
    DEFAULT_CROSSREF_BASE_URL, DEFAULT_DOI_METADATA_TIMEOUT_SECS, DEFAULT_DOI_RESOLVER_BASE_URL,
    DEFAULT_DOI_RESOLVER_TIMEOUT_SECS, DoiResolver, DoiResolverConfig, normalize_doi,
};
pub use error::ResolveError;
pub use registry::ResolverRegistry;

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::identifier::IdentifierType;

/// Builds the default registry: direct URLs, accession templates, DOIs.
///
/// All network-backed resolvers share `client`.
///
/// # Errors
///
/// Returns [`ResolveError`] when the DOI resolver configuration is invalid.
pub fn build_default_resolver_registry(
    client: Client,
    accession_table: AccessionTable,
    doi_config: DoiResolverConfig,
) -> Result<ResolverRegistry, ResolveError> {
    let mut registry = ResolverRegistry::new();
    registry.register(Box::new(DirectResolver::new()));
    registry.register(Box::new(AccessionResolver::new(accession_table)));
    registry.register(Box::new(DoiResolver::new(client, doi_config)?));
    Ok(registry)
}

/// Which strategy produced a resolved URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Input was already a URL
    Passthrough,
    /// Accession substituted into a URL template
    AccessionTemplate,
    /// URL field of the DOI metadata record
    DoiMetadata,
    /// Final URL after following the generic DOI resolver
    DoiResolver,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Passthrough => "passthrough",
            Self::AccessionTemplate => "accession_template",
            Self::DoiMetadata => "doi_metadata",
            Self::DoiResolver => "doi_resolver",
        };
        f.write_str(label)
    }
}

/// A successfully resolved landing-page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUrl {
    /// The URL to probe.
    pub url: String,
    /// Strategy that produced it.
    pub source: ResolutionSource,
}

impl ResolvedUrl {
    /// Creates a resolved URL.
    #[must_use]
    pub fn new(url: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// Trait that all resolvers must implement.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via `Box<dyn Resolver>`.
/// Rust 2024 native async traits are not object-safe, so `async_trait` is required
/// for the registry pattern.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the resolver's name (e.g., "direct", "accession", "doi").
    fn name(&self) -> &str;

    /// Returns true if this resolver handles identifiers of the given type.
    fn can_handle(&self, identifier_type: IdentifierType) -> bool;

    /// Resolves the identifier into a landing-page URL.
    async fn resolve(&self, input: &str) -> Result<ResolvedUrl, ResolveError>;
}
