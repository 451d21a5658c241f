//! Types representing identifier records read from input.

use std::fmt;

use serde::Serialize;

/// Kind of identifier, and therefore which resolution strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    /// Direct HTTP/HTTPS URL
    Url,
    /// DOI (`10.xxxx/suffix`)
    Doi,
    /// Repository accession (GenBank, GEO, SRA, ...)
    Accession,
}

impl IdentifierType {
    /// Parses a declared type label.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unknown labels return `None`, which leaves the type to inference.
    #[must_use]
    pub fn from_declared(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("url") {
            Some(Self::Url)
        } else if label.eq_ignore_ascii_case("doi") {
            Some(Self::Doi)
        } else if label.eq_ignore_ascii_case("accession") {
            Some(Self::Accession)
        } else {
            None
        }
    }

    /// Returns the lowercase label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Doi => "doi",
            Self::Accession => "accession",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => write!(f, "URL"),
            Self::Doi => write!(f, "DOI"),
            Self::Accession => write!(f, "Accession"),
        }
    }
}

/// A single identifier as read from input. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierRecord {
    /// Identifier text exactly as given
    pub raw_value: String,
    /// Type declared by the input, if any
    pub declared_type: Option<IdentifierType>,
    /// Repository label carried through to reports
    pub repo_label: Option<String>,
}

impl IdentifierRecord {
    /// Creates a record with no declared type or repository label.
    #[must_use]
    pub fn new(raw_value: impl Into<String>) -> Self {
        Self {
            raw_value: raw_value.into(),
            declared_type: None,
            repo_label: None,
        }
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_declared_type(mut self, declared_type: IdentifierType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    /// Sets the repository label.
    #[must_use]
    pub fn with_repo_label(mut self, repo_label: impl Into<String>) -> Self {
        self.repo_label = Some(repo_label.into());
        self
    }
}

impl fmt::Display for IdentifierRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared_type {
            Some(declared) => write!(f, "[{declared}] {}", self.raw_value),
            None => f.write_str(&self.raw_value),
        }
    }
}

/// Identifier records parsed from a text list.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Records in input order
    pub records: Vec<IdentifierRecord>,
    /// Lines that could not be read as a record (for logging)
    pub skipped: Vec<String>,
}

impl ParseResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no records were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns count of parsed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns count of skipped lines.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsed {} identifiers ({} skipped)",
            self.records.len(),
            self.skipped.len()
        )
    }
}
