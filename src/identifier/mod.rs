//! Identifier input parsing and classification.
//!
//! Input files and stdin are line-oriented. Each line holds
//! `value[,declared_type[,repo_label]]` as a CSV row (quote a value that
//! contains commas) or as tab-separated fields. Blank lines and `#` comments
//! are ignored, and a leading header row whose first field is `identifier`
//! or `id` is skipped.
//!
//! An unquoted comma row whose second field is not a type label is kept
//! whole, so `https://example.org/search?ids=1,2` stays one identifier.
//!
//! Command-line arguments go through [`parse_identifier_args`] instead and
//! are taken verbatim.
//!
//! # Example
//!
//! ```
//! use findable_core::identifier::{IdentifierType, classify, parse_identifier_list};
//!
//! let result = parse_identifier_list("identifier,type,repo\n10.5061/dryad.4j0zpc8p9,,Dryad\nNC_045512");
//! assert_eq!(result.len(), 2);
//! assert_eq!(classify(result.records[0].clone()).resolved_type, IdentifierType::Doi);
//! assert_eq!(classify(result.records[1].clone()).resolved_type, IdentifierType::Accession);
//! ```

mod classify;
mod input;

pub use classify::{ClassifiedIdentifier, classify, infer_type};
pub use input::{IdentifierRecord, IdentifierType, ParseResult};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};

/// Parses a line-oriented identifier list into records, preserving order.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn parse_identifier_list(input: &str) -> ParseResult {
    let mut result = ParseResult::new();
    let mut seen_content = false;

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(fields) = split_fields(line) else {
            result.skipped.push(line.to_string());
            continue;
        };
        let first_content_line = !seen_content;
        seen_content = true;

        if first_content_line && is_header(&fields) {
            debug!("Skipping header row");
            continue;
        }

        let Some(value) = fields.first().filter(|value| !value.is_empty()) else {
            result.skipped.push(line.to_string());
            continue;
        };

        let mut record = IdentifierRecord::new(value.as_str());
        if let Some(declared) = fields.get(1).filter(|label| !label.is_empty()) {
            match IdentifierType::from_declared(declared) {
                Some(declared_type) => record = record.with_declared_type(declared_type),
                None => warn!(
                    identifier = %value,
                    declared = %declared,
                    "Unknown declared type; inferring instead"
                ),
            }
        }
        if let Some(repo) = fields.get(2).filter(|repo| !repo.is_empty()) {
            record = record.with_repo_label(repo.as_str());
        }
        result.records.push(record);
    }

    info!(
        identifiers = result.len(),
        skipped = result.skipped_count(),
        "Parsing complete"
    );
    result
}

/// Builds records from command-line arguments, one identifier per argument.
#[must_use]
pub fn parse_identifier_args<S: AsRef<str>>(args: &[S]) -> ParseResult {
    let mut result = ParseResult::new();
    for arg in args {
        let value = arg.as_ref().trim();
        if value.is_empty() {
            result.skipped.push(arg.as_ref().to_string());
        } else {
            result.records.push(IdentifierRecord::new(value));
        }
    }
    result
}

/// Splits one row into at most three fields. `None` if the row is not valid CSV.
fn split_fields(line: &str) -> Option<Vec<String>> {
    let delimiter = if line.contains('\t') { b'\t' } else { b',' };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());
    let row = match reader.records().next()? {
        Ok(row) => row,
        Err(e) => {
            debug!(error = %e, "Unreadable input row");
            return None;
        }
    };
    let mut fields: Vec<String> = row.iter().map(str::to_string).collect();

    let unquoted_comma_row = delimiter == b',' && !line.starts_with('"');
    let stray_second_field = fields
        .get(1)
        .is_some_and(|label| !label.is_empty() && IdentifierType::from_declared(label).is_none());
    if unquoted_comma_row && stray_second_field && !is_header(&fields) {
        return Some(vec![line.to_string()]);
    }

    if fields.len() > 3 {
        // Extra trailing fields belong to the repository label.
        let rest = fields.split_off(2).join(if delimiter == b',' { "," } else { "\t" });
        fields.push(rest);
    }
    Some(fields)
}

fn is_header(fields: &[String]) -> bool {
    fields.first().is_some_and(|first| {
        first.eq_ignore_ascii_case("identifier") || first.eq_ignore_ascii_case("id")
    })
}
