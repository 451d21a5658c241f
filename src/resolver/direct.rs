//! Direct URL resolver - passthrough for identifiers that already are URLs.

use async_trait::async_trait;

use crate::identifier::IdentifierType;

use super::{ResolutionSource, ResolveError, ResolvedUrl, Resolver};

/// A resolver that passes URLs through unchanged.
#[derive(Debug)]
pub struct DirectResolver;

impl DirectResolver {
    /// Creates a new `DirectResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for DirectResolver {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn can_handle(&self, identifier_type: IdentifierType) -> bool {
        identifier_type == IdentifierType::Url
    }

    #[tracing::instrument(skip(self), fields(resolver = "direct"))]
    async fn resolve(&self, input: &str) -> Result<ResolvedUrl, ResolveError> {
        Ok(ResolvedUrl::new(input, ResolutionSource::Passthrough))
    }
}
