//! Failure kinds recorded per identifier and their user-facing descriptors.
//!
//! Every resolution or probe failure is collapsed into one [`ErrorKind`] that
//! is stored in the identifier's result record. The kind never aborts a run;
//! it only explains why an identifier scored zero.

use std::fmt;

use serde::Serialize;

/// Why an identifier did not produce a usable landing-page response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Accession prefix is not in the template table.
    Unsupported,
    /// Primary DOI metadata API returned an unexpected status (not 200, not 404).
    UpstreamError,
    /// Both DOI resolution stages were exhausted without a usable URL.
    ResolutionFailed,
    /// A network call exceeded its deadline.
    Timeout,
    /// Connection-level failure or malformed response.
    TransportError,
    /// Probe never attempted because resolution produced no URL.
    SkippedNoUrl,
}

impl ErrorKind {
    /// All kinds, in reporting order.
    pub const ALL: [Self; 6] = [
        Self::Unsupported,
        Self::UpstreamError,
        Self::ResolutionFailed,
        Self::Timeout,
        Self::TransportError,
        Self::SkippedNoUrl,
    ];

    /// Returns the stable snake_case label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::UpstreamError => "upstream_error",
            Self::ResolutionFailed => "resolution_failed",
            Self::Timeout => "timeout",
            Self::TransportError => "transport_error",
            Self::SkippedNoUrl => "skipped_no_url",
        }
    }

    /// Returns the What/Why/Fix descriptor for this kind.
    #[must_use]
    pub fn descriptor(self) -> FailureDescriptor {
        match self {
            Self::Unsupported => FailureDescriptor {
                what: "Unsupported accession",
                why: "No accession prefix in the template table matches this identifier.",
                fix: "Add a template with `accession.<PREFIX> = \"https://.../{acc}\"` in the config file.",
            },
            Self::UpstreamError => FailureDescriptor {
                what: "DOI metadata service error",
                why: "The DOI metadata API answered with an unexpected HTTP status.",
                fix: "Retry later; the metadata service may be degraded or rate limiting.",
            },
            Self::ResolutionFailed => FailureDescriptor {
                what: "DOI could not be resolved",
                why: "Neither the metadata API nor the generic DOI resolver produced a URL.",
                fix: "Check that the DOI is registered and spelled correctly.",
            },
            Self::Timeout => FailureDescriptor {
                what: "Request timed out",
                why: "The remote host did not respond within the request timeout window.",
                fix: "Increase --probe-timeout or check network stability before retrying.",
            },
            Self::TransportError => FailureDescriptor {
                what: "Network request failed",
                why: "Connectivity, DNS, TLS, or a malformed response interrupted the request.",
                fix: "Verify the landing page URL and your network connection.",
            },
            Self::SkippedNoUrl => FailureDescriptor {
                what: "Landing page not probed",
                why: "Resolution produced no URL, so there was nothing to probe.",
                fix: "See the resolution error for this identifier.",
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing explanation of a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureDescriptor {
    pub what: &'static str,
    pub why: &'static str,
    pub fix: &'static str,
}
