//! Resolver registry dispatching identifiers by resolved type.

use tracing::debug;

use crate::identifier::{ClassifiedIdentifier, IdentifierType};

use super::{ResolveError, ResolvedUrl, Resolver};

/// An ordered collection of resolvers.
///
/// Each identifier is handed to the first registered resolver that handles
/// its resolved type. There is no chaining between resolvers: a resolver's
/// error is the identifier's final resolution outcome.
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Creates an empty resolver registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Registers a resolver with the registry.
    pub fn register(&mut self, resolver: Box<dyn Resolver>) {
        debug!(name = resolver.name(), "Registering resolver");
        self.resolvers.push(resolver);
    }

    /// Returns the number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolvers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Returns the first resolver handling the given type.
    #[must_use]
    pub fn find_handler(&self, identifier_type: IdentifierType) -> Option<&dyn Resolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.can_handle(identifier_type))
            .map(AsRef::as_ref)
    }

    /// Resolves a classified identifier with the resolver for its type.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoResolver` if no registered resolver handles the type,
    /// otherwise whatever the selected resolver returns.
    #[tracing::instrument(skip(self, identifier), fields(identifier_type = %identifier.resolved_type))]
    pub async fn resolve(
        &self,
        identifier: &ClassifiedIdentifier,
    ) -> Result<ResolvedUrl, ResolveError> {
        let input = identifier.raw_value();
        let Some(handler) = self.find_handler(identifier.resolved_type) else {
            return Err(ResolveError::no_resolver(input, identifier.resolved_type));
        };

        debug!(resolver = handler.name(), "Dispatching identifier");
        handler.resolve(input).await
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::failure::ErrorKind;
    use crate::identifier::{IdentifierRecord, classify};
    use crate::resolver::{AccessionResolver, AccessionTable, DirectResolver, ResolutionSource};

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ResolverRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolver_count(), 0);
    }

    #[test]
    fn test_registry_debug_lists_resolver_names() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(DirectResolver::new()));
        assert!(format!("{registry:?}").contains("direct"));
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_resolved_type() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(DirectResolver::new()));
        registry.register(Box::new(AccessionResolver::new(AccessionTable::default())));

        let url = classify(IdentifierRecord::new("https://x.org/d"));
        let resolved = registry.resolve(&url).await.unwrap();
        assert_eq!(resolved.source, ResolutionSource::Passthrough);

        let accession = classify(IdentifierRecord::new("NC_045512"));
        let resolved = registry.resolve(&accession).await.unwrap();
        assert_eq!(resolved.source, ResolutionSource::AccessionTemplate);
        assert!(resolved.url.ends_with("NC_045512"));
    }

    #[tokio::test]
    async fn test_registry_without_handler_returns_no_resolver() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(DirectResolver::new()));

        let doi = classify(IdentifierRecord::new("10.1234/test"));
        let err = registry.resolve(&doi).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoResolver { .. }));
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
