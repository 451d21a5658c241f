//! Per-identifier outcomes and the terminal result record.

use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::failure::ErrorKind;
use crate::identifier::ClassifiedIdentifier;
use crate::probe::{ProbeError, ProbeResponse};
use crate::resolver::{ResolutionSource, ResolveError, ResolvedUrl};

/// Scores a probe status: 1 for any 2xx, 0 for everything else.
#[must_use]
pub fn findable_score(http_status: Option<u16>) -> u8 {
    u8::from(http_status.is_some_and(|status| (200..=299).contains(&status)))
}

// ==================== Resolution ====================

/// Either a resolved URL or the reason there is none, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// A URL to probe.
    Resolved(ResolvedUrl),
    /// No URL; probing is skipped.
    Failed {
        /// Failure kind.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl ResolutionOutcome {
    /// Creates a failed outcome from a resolver error.
    #[must_use]
    pub fn from_error(error: &ResolveError) -> Self {
        Self::failed(error.kind(), error.to_string())
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    /// The URL to probe, if resolution succeeded.
    #[must_use]
    pub fn resolved_url(&self) -> Option<&str> {
        match self {
            Self::Resolved(resolved) => Some(&resolved.url),
            Self::Failed { .. } => None,
        }
    }

    /// Which strategy produced the URL.
    #[must_use]
    pub fn source(&self) -> Option<ResolutionSource> {
        match self {
            Self::Resolved(resolved) => Some(resolved.source),
            Self::Failed { .. } => None,
        }
    }

    /// The failure kind, if resolution failed.
    #[must_use]
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }

    /// Failure detail, if resolution failed.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

impl From<Result<ResolvedUrl, ResolveError>> for ResolutionOutcome {
    fn from(result: Result<ResolvedUrl, ResolveError>) -> Self {
        match result {
            Ok(resolved) => Self::Resolved(resolved),
            Err(error) => Self::from_error(&error),
        }
    }
}

impl Serialize for ResolutionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolutionOutcome", 4)?;
        state.serialize_field("resolved_url", &self.resolved_url())?;
        state.serialize_field("source", &self.source())?;
        state.serialize_field("error", &self.error())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

// ==================== Probe ====================

/// What happened when (or instead of) probing the resolved URL.
///
/// Status and final URL are present together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered.
    Completed(ProbeResponse),
    /// The request failed before a response arrived.
    Failed {
        /// `Timeout` or `TransportError`.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
        /// Time spent before the failure.
        elapsed: Duration,
    },
    /// Resolution produced no URL, so no request was made.
    Skipped,
}

impl ProbeOutcome {
    /// Creates a failed outcome from a probe error.
    #[must_use]
    pub fn from_error(error: &ProbeError) -> Self {
        Self::Failed {
            kind: error.kind(),
            message: error.to_string(),
            elapsed: error.elapsed(),
        }
    }

    /// HTTP status of the final response.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Completed(response) => Some(response.status),
            Self::Failed { .. } | Self::Skipped => None,
        }
    }

    /// URL of the final response after redirects.
    #[must_use]
    pub fn final_url(&self) -> Option<&str> {
        match self {
            Self::Completed(response) => Some(&response.final_url),
            Self::Failed { .. } | Self::Skipped => None,
        }
    }

    /// Wall-clock probe time; zero when skipped.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Completed(response) => response.elapsed,
            Self::Failed { elapsed, .. } => *elapsed,
            Self::Skipped => Duration::ZERO,
        }
    }

    /// The failure kind, if the probe did not complete.
    #[must_use]
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { kind, .. } => Some(*kind),
            Self::Skipped => Some(ErrorKind::SkippedNoUrl),
        }
    }

    /// Failure detail, if the probe did not complete.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) | Self::Skipped => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

impl From<Result<ProbeResponse, ProbeError>> for ProbeOutcome {
    fn from(result: Result<ProbeResponse, ProbeError>) -> Self {
        match result {
            Ok(response) => Self::Completed(response),
            Err(error) => Self::from_error(&error),
        }
    }
}

impl Serialize for ProbeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProbeOutcome", 5)?;
        state.serialize_field("http_status", &self.http_status())?;
        state.serialize_field("final_url", &self.final_url())?;
        state.serialize_field("elapsed_seconds", &self.elapsed().as_secs_f64())?;
        state.serialize_field("error", &self.error())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

// ==================== Result Record ====================

/// Terminal per-identifier record handed to report sinks.
///
/// The findable score is derived from the probe outcome when the record is
/// built and cannot drift from it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    identifier: ClassifiedIdentifier,
    resolution: ResolutionOutcome,
    probe: ProbeOutcome,
    findable_score: u8,
}

impl ResultRecord {
    /// Builds a finished record and scores it.
    #[must_use]
    pub fn new(
        identifier: ClassifiedIdentifier,
        resolution: ResolutionOutcome,
        probe: ProbeOutcome,
    ) -> Self {
        let findable_score = findable_score(probe.http_status());
        Self {
            identifier,
            resolution,
            probe,
            findable_score,
        }
    }

    /// The classified input identifier.
    #[must_use]
    pub fn identifier(&self) -> &ClassifiedIdentifier {
        &self.identifier
    }

    /// How the identifier was resolved.
    #[must_use]
    pub fn resolution(&self) -> &ResolutionOutcome {
        &self.resolution
    }

    /// How the landing page answered.
    #[must_use]
    pub fn probe(&self) -> &ProbeOutcome {
        &self.probe
    }

    /// 1 if the landing page answered 2xx, else 0.
    #[must_use]
    pub fn findable_score(&self) -> u8 {
        self.findable_score
    }

    /// True when the score is 1.
    #[must_use]
    pub fn is_findable(&self) -> bool {
        self.findable_score == 1
    }

    /// The first failure on this record: resolution before probe.
    #[must_use]
    pub fn error(&self) -> Option<ErrorKind> {
        self.resolution.error().or_else(|| self.probe.error())
    }
}
