//! DOI resolver - Crossref metadata lookup with `doi.org` fallback.
//!
//! Resolution runs as two sequential, guarded attempts:
//!
//! 1. `GET {crossref}/works/{doi}`. A 200 carrying `message.URL` resolves
//!    immediately. A 200 without a usable URL, an unparseable body, a 404, or
//!    any transport failure falls through to stage 2. Any other status stops
//!    with an upstream error.
//! 2. `GET {doi.org}/{doi}` following redirects. A final 200 resolves to the
//!    post-redirect URL; everything else is a resolution failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::identifier::IdentifierType;

use super::{ResolutionSource, ResolveError, ResolvedUrl, Resolver};

/// Default Crossref API base URL.
pub const DEFAULT_CROSSREF_BASE_URL: &str = "https://api.crossref.org";

/// Default generic DOI resolver base URL.
pub const DEFAULT_DOI_RESOLVER_BASE_URL: &str = "https://doi.org";

/// Deadline for the Crossref metadata call.
pub const DEFAULT_DOI_METADATA_TIMEOUT_SECS: u64 = 10;

/// Deadline for the generic resolver call, which may redirect several times.
pub const DEFAULT_DOI_RESOLVER_TIMEOUT_SECS: u64 = 15;

/// Prefixes stripped from DOI input before lookup.
const DOI_INPUT_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

// ==================== Crossref API Response Types ====================

/// Top-level Crossref works response.
#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefResponse {
    pub message: CrossrefMessage,
}

/// The `message` field from a Crossref works response.
#[derive(Debug, Deserialize)]
pub(crate) struct CrossrefMessage {
    /// The landing-page URL is uppercase in the Crossref response.
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

// ==================== Configuration ====================

/// Endpoints, deadlines, and contact address for DOI resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiResolverConfig {
    /// Crossref REST API base URL.
    pub metadata_base_url: String,
    /// Generic DOI resolver base URL.
    pub resolver_base_url: String,
    /// Contact address for the Crossref polite pool.
    pub mailto: Option<String>,
    /// Deadline for stage 1.
    pub metadata_timeout: Duration,
    /// Deadline for stage 2.
    pub resolver_timeout: Duration,
}

impl Default for DoiResolverConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: DEFAULT_CROSSREF_BASE_URL.to_string(),
            resolver_base_url: DEFAULT_DOI_RESOLVER_BASE_URL.to_string(),
            mailto: None,
            metadata_timeout: Duration::from_secs(DEFAULT_DOI_METADATA_TIMEOUT_SECS),
            resolver_timeout: Duration::from_secs(DEFAULT_DOI_RESOLVER_TIMEOUT_SECS),
        }
    }
}

// ==================== DoiResolver ====================

/// Outcome of the Crossref stage.
#[derive(Debug)]
enum MetadataLookup {
    /// Metadata carried a landing-page URL.
    Found(String),
    /// Inconclusive; the generic resolver decides.
    Fallback(&'static str),
    /// Unexpected status; resolution stops here.
    Upstream(u16),
}

/// Resolves DOIs through Crossref metadata, falling back to `doi.org`.
pub struct DoiResolver {
    client: Client,
    config: DoiResolverConfig,
}

impl DoiResolver {
    /// Creates a resolver that issues requests on the shared `client`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the `mailto` address contains control characters.
    #[tracing::instrument(skip_all, fields(metadata_base_url = %config.metadata_base_url))]
    pub fn new(client: Client, config: DoiResolverConfig) -> Result<Self, ResolveError> {
        if let Some(mailto) = &config.mailto
            && mailto.chars().any(|c| c == '\n' || c == '\r' || c == '\0')
        {
            return Err(ResolveError::resolution_failed(
                mailto,
                "mailto contains invalid control characters",
            ));
        }
        Ok(Self { client, config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &DoiResolverConfig {
        &self.config
    }

    fn metadata_url(&self, doi: &str) -> String {
        let base = self.config.metadata_base_url.trim_end_matches('/');
        let encoded_doi = urlencoding::encode(doi);
        match &self.config.mailto {
            Some(mailto) => format!(
                "{base}/works/{encoded_doi}?mailto={}",
                urlencoding::encode(mailto)
            ),
            None => format!("{base}/works/{encoded_doi}"),
        }
    }

    fn resolver_url(&self, doi: &str) -> String {
        let base = self.config.resolver_base_url.trim_end_matches('/');
        let path: Vec<_> = doi.split('/').map(urlencoding::encode).collect();
        format!("{base}/{}", path.join("/"))
    }

    async fn lookup_metadata(&self, doi: &str) -> MetadataLookup {
        let url = self.metadata_url(doi);
        debug!(api_url = %url, "Calling Crossref API");

        let response = match self
            .client
            .get(&url)
            .timeout(self.config.metadata_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                debug!(error = %e, "Crossref API request timed out");
                return MetadataLookup::Fallback("metadata request timed out");
            }
            Err(e) => {
                debug!(error = %e, "Crossref API request failed");
                return MetadataLookup::Fallback("metadata request failed");
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return MetadataLookup::Fallback("DOI not found in Crossref"),
            status => return MetadataLookup::Upstream(status.as_u16()),
        }

        match response.json::<CrossrefResponse>().await {
            Ok(body) => match body.message.url.filter(|url| !url.trim().is_empty()) {
                Some(url) => MetadataLookup::Found(url),
                None => MetadataLookup::Fallback("metadata has no URL"),
            },
            Err(e) => {
                warn!(error = %e, "Failed to parse Crossref response JSON");
                MetadataLookup::Fallback("unexpected metadata response format")
            }
        }
    }

    async fn follow_resolver(&self, doi: &str) -> Result<ResolvedUrl, ResolveError> {
        let url = self.resolver_url(doi);
        debug!(resolver_url = %url, "Following generic DOI resolver");

        let response = match self
            .client
            .get(&url)
            .timeout(self.config.resolver_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "DOI resolver request timed out");
                return Err(ResolveError::resolution_failed(
                    doi,
                    "DOI resolver request timed out",
                ));
            }
            Err(e) => {
                warn!(error = %e, "DOI resolver request failed");
                return Err(ResolveError::resolution_failed(
                    doi,
                    "Cannot reach the DOI resolver. Check your network connection.",
                ));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "DOI resolver did not reach a landing page");
            return Err(ResolveError::resolution_failed(
                doi,
                &format!("DOI resolver returned HTTP {}", status.as_u16()),
            ));
        }

        Ok(ResolvedUrl::new(
            response.url().as_str(),
            ResolutionSource::DoiResolver,
        ))
    }
}

impl std::fmt::Debug for DoiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoiResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Resolver for DoiResolver {
    fn name(&self) -> &'static str {
        "doi"
    }

    fn can_handle(&self, identifier_type: IdentifierType) -> bool {
        identifier_type == IdentifierType::Doi
    }

    #[tracing::instrument(skip(self), fields(resolver = "doi", doi = %input))]
    async fn resolve(&self, input: &str) -> Result<ResolvedUrl, ResolveError> {
        let doi = normalize_doi(input);
        if doi.is_empty() {
            return Err(ResolveError::resolution_failed(input, "empty DOI"));
        }

        match self.lookup_metadata(doi).await {
            MetadataLookup::Found(url) => {
                debug!(url = %url, "Resolved via Crossref metadata");
                return Ok(ResolvedUrl::new(url, ResolutionSource::DoiMetadata));
            }
            MetadataLookup::Upstream(status) => {
                warn!(status, "Crossref API returned unexpected status");
                return Err(ResolveError::upstream(doi, status));
            }
            MetadataLookup::Fallback(reason) => {
                debug!(%reason, "Crossref inconclusive; falling back to DOI resolver");
            }
        }

        let resolved = self.follow_resolver(doi).await?;
        debug!(url = %resolved.url, "Resolved via DOI resolver");
        Ok(resolved)
    }
}

/// Strips whitespace and `doi:` / `doi.org` URL prefixes from DOI input.
#[must_use]
pub fn normalize_doi(input: &str) -> &str {
    let trimmed = input.trim();
    for prefix in DOI_INPUT_PREFIXES {
        if let Some(head) = trimmed.get(..prefix.len())
            && head.eq_ignore_ascii_case(prefix)
        {
            return trimmed[prefix.len()..].trim_start();
        }
    }
    trimmed
}
