//! Error types for resolver operations.
//!
//! This module defines structured errors for identifier resolution,
//! following the What/Why/Fix pattern used across the project. Each error
//! collapses to one [`ErrorKind`] for the result record.

use thiserror::Error;

use crate::failure::ErrorKind;
use crate::identifier::IdentifierType;

/// Errors that can occur while resolving an identifier to a URL.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No registered resolver handles this identifier type
    #[error("no resolver found for {identifier_type} '{input}'\n  Suggestion: {suggestion}")]
    NoResolver {
        /// The identifier no resolver could handle
        input: String,
        /// Its resolved type
        identifier_type: IdentifierType,
        /// How to fix the issue
        suggestion: String,
    },

    /// Accession prefix is not in the template table
    #[error("unsupported accession '{input}': {reason}\n  Suggestion: {suggestion}")]
    Unsupported {
        /// The accession that matched no prefix
        input: String,
        /// Why it is unsupported
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// DOI metadata API answered with an unexpected status
    #[error("DOI metadata API returned HTTP {status} for '{input}'\n  Suggestion: Try again later")]
    Upstream {
        /// The DOI being resolved
        input: String,
        /// The unexpected HTTP status
        status: u16,
    },

    /// Every resolution stage was exhausted without a usable URL
    #[error("resolution failed for '{input}': {reason}\n  Suggestion: {suggestion}")]
    ResolutionFailed {
        /// The input that failed resolution
        input: String,
        /// Why resolution failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ResolveError {
    /// Creates a `NoResolver` error.
    #[must_use]
    pub fn no_resolver(input: &str, identifier_type: IdentifierType) -> Self {
        Self::NoResolver {
            input: input.to_string(),
            identifier_type,
            suggestion: "Register a resolver for this identifier type".to_string(),
        }
    }

    /// Creates an `Unsupported` error for an accession with no matching prefix.
    #[must_use]
    pub fn unsupported(input: &str) -> Self {
        Self::Unsupported {
            input: input.to_string(),
            reason: "no accession prefix in the template table matches".to_string(),
            suggestion: "Add an `accession.<PREFIX>` template to the config file".to_string(),
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(input: &str, status: u16) -> Self {
        Self::Upstream {
            input: input.to_string(),
            status,
        }
    }

    /// Creates a `ResolutionFailed` error.
    #[must_use]
    pub fn resolution_failed(input: &str, reason: &str) -> Self {
        Self::ResolutionFailed {
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Check that the identifier is registered and try again".to_string(),
        }
    }

    /// Returns the failure kind recorded for the identifier.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoResolver { .. } | Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Upstream { .. } => ErrorKind::UpstreamError,
            Self::ResolutionFailed { .. } => ErrorKind::ResolutionFailed,
        }
    }
}
