//! Error types for landing-page probes.

use std::time::Duration;

use thiserror::Error;

use crate::failure::ErrorKind;

/// Errors that end a single probe without an HTTP response.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request did not complete within the probe timeout.
    #[error("timeout probing {url} after {:.3}s", elapsed.as_secs_f64())]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// Time spent before giving up.
        elapsed: Duration,
    },

    /// Network-level error (DNS, connection refused, TLS, redirect loop, etc.)
    #[error("network error probing {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// Time spent before the failure surfaced.
        elapsed: Duration,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The resolved URL is malformed or not http(s).
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl ProbeError {
    /// Maps a failed send into `Timeout` or `Transport`.
    pub(crate) fn from_reqwest(url: &str, elapsed: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                elapsed,
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                elapsed,
                source,
            }
        }
    }

    /// Creates an invalid URL error.
    pub(crate) fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the failure kind recorded for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Transport { .. } | Self::InvalidUrl { .. } => ErrorKind::TransportError,
        }
    }

    /// Wall-clock time spent on the attempt. Zero when no request was sent.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Timeout { elapsed, .. } | Self::Transport { elapsed, .. } => *elapsed,
            Self::InvalidUrl { .. } => Duration::ZERO,
        }
    }
}
