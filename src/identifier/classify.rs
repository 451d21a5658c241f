//! Identifier classification: URL, DOI, or accession.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::input::{IdentifierRecord, IdentifierType};

/// Scheme check for direct URLs.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://").expect("URL regex is valid") // Static pattern, safe to panic
});

/// Bare DOI shape: `10.XXXX/suffix` with no whitespace in the suffix.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^10\.\d{4,9}/\S+$").expect("DOI regex is valid") // Static pattern, safe to panic
});

/// An identifier record with exactly one resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedIdentifier {
    #[serde(flatten)]
    pub record: IdentifierRecord,
    pub resolved_type: IdentifierType,
}

impl ClassifiedIdentifier {
    /// Identifier text exactly as given.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.record.raw_value
    }
}

/// Infers the identifier type from its shape alone.
///
/// `https?://` wins over the DOI shape; anything else is an accession.
#[must_use]
pub fn infer_type(raw: &str) -> IdentifierType {
    let value = raw.trim();
    if URL_PATTERN.is_match(value) {
        IdentifierType::Url
    } else if DOI_PATTERN.is_match(value) {
        IdentifierType::Doi
    } else {
        IdentifierType::Accession
    }
}

/// Classifies an identifier record. The declared type always takes precedence.
#[must_use]
pub fn classify(record: IdentifierRecord) -> ClassifiedIdentifier {
    let resolved_type = record
        .declared_type
        .unwrap_or_else(|| infer_type(&record.raw_value));
    ClassifiedIdentifier {
        record,
        resolved_type,
    }
}
