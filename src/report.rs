//! Report sinks for pipeline results.
//!
//! Three renderings of the same ordered result list: a tab-separated table
//! with every field, a two-column summary, and JSON. [`write_failure_hints`]
//! renders the What/Why/Fix text for the failures in a run.

use std::collections::BTreeMap;
use std::io::Write;

use thiserror::Error;

use crate::failure::ErrorKind;
use crate::pipeline::ResultRecord;

/// Column names of the tabular report, in order.
pub const TABLE_COLUMNS: [&str; 10] = [
    "identifier",
    "declared_type",
    "resolved_type",
    "repo",
    "resolved_url",
    "http_status",
    "final_url",
    "elapsed_seconds",
    "error",
    "findable",
];

/// Errors raised while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output stream rejected a write.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Results could not be serialized to JSON.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Tab-separated table with a header row.
    #[default]
    Table,
    /// `identifier<TAB>score` lines.
    Summary,
    /// Pretty-printed JSON array.
    Json,
}

/// Writes `results` to `out` in the requested format.
///
/// # Errors
///
/// Returns [`ReportError`] if writing or serialization fails.
pub fn write_report<W: Write>(
    out: &mut W,
    results: &[ResultRecord],
    format: ReportFormat,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Table => write_table(out, results),
        ReportFormat::Summary => write_summary(out, results),
        ReportFormat::Json => write_json(out, results),
    }
}

/// Writes the full tab-separated table. Absent values are empty cells.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if writing fails.
pub fn write_table<W: Write>(out: &mut W, results: &[ResultRecord]) -> Result<(), ReportError> {
    writeln!(out, "{}", TABLE_COLUMNS.join("\t"))?;
    for record in results {
        let identifier = record.identifier();
        let probe = record.probe();
        let cells = [
            sanitize_cell(identifier.raw_value()),
            identifier
                .record
                .declared_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            identifier.resolved_type.as_str().to_string(),
            identifier
                .record
                .repo_label
                .as_deref()
                .map(sanitize_cell)
                .unwrap_or_default(),
            record
                .resolution()
                .resolved_url()
                .map(sanitize_cell)
                .unwrap_or_default(),
            probe
                .http_status()
                .map(|status| status.to_string())
                .unwrap_or_default(),
            probe.final_url().map(sanitize_cell).unwrap_or_default(),
            format!("{:.3}", probe.elapsed().as_secs_f64()),
            record
                .error()
                .map(|kind| kind.as_str().to_string())
                .unwrap_or_default(),
            record.findable_score().to_string(),
        ];
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

/// Writes `identifier<TAB>findable_score` per record, in order.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if writing fails.
pub fn write_summary<W: Write>(out: &mut W, results: &[ResultRecord]) -> Result<(), ReportError> {
    for record in results {
        writeln!(
            out,
            "{}\t{}",
            sanitize_cell(record.identifier().raw_value()),
            record.findable_score()
        )?;
    }
    Ok(())
}

/// Writes results as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization or writing fails.
pub fn write_json<W: Write>(out: &mut W, results: &[ResultRecord]) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

/// Writes one What/Why/Fix hint per distinct failure kind in `results`.
///
/// Kinds appear in [`ErrorKind`] order with the number of identifiers they
/// affected. Nothing is written when every record succeeded.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if writing fails.
pub fn write_failure_hints<W: Write>(
    out: &mut W,
    results: &[ResultRecord],
) -> Result<(), ReportError> {
    let mut counts: BTreeMap<ErrorKind, usize> = BTreeMap::new();
    for kind in results.iter().filter_map(ResultRecord::error) {
        *counts.entry(kind).or_default() += 1;
    }

    for (kind, count) in counts {
        let descriptor = kind.descriptor();
        let noun = if count == 1 { "identifier" } else { "identifiers" };
        writeln!(out, "{kind} ({count} {noun}): {}", descriptor.what)?;
        writeln!(out, "  Why: {}", descriptor.why)?;
        writeln!(out, "  Fix: {}", descriptor.fix)?;
    }
    Ok(())
}

/// Tabs and line breaks would shift columns; replace them with spaces.
fn sanitize_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
