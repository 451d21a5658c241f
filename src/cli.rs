//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use findable_core::{PipelineConfig, ReportFormat};

/// Check whether dataset identifiers lead to a reachable landing page.
///
/// Each identifier (URL, DOI, or repository accession) is resolved to a
/// landing-page URL, probed with a single GET, and scored 1 when the page
/// answers 2xx, otherwise 0.
#[derive(Parser, Debug)]
#[command(name = "findable")]
#[command(author, version, about)]
pub struct Args {
    /// Identifiers to check, taken verbatim; stdin is read when omitted
    #[arg(value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,

    /// Read identifiers from a file (CSV rows, `value[,type[,repo]]`)
    #[arg(short = 'i', long, value_name = "FILE", conflicts_with = "identifiers")]
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent network operations (1-100) [default: 10]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Landing-page probe timeout in seconds (1-3600) [default: 10]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub probe_timeout: Option<u64>,

    /// DOI metadata (Crossref) timeout in seconds (1-3600) [default: 10]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub doi_metadata_timeout: Option<u64>,

    /// Generic DOI resolver timeout in seconds (1-3600) [default: 15]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub doi_resolver_timeout: Option<u64>,

    /// Contact email sent to Crossref for polite-pool access
    #[arg(long, value_name = "EMAIL")]
    pub mailto: Option<String>,

    /// Config file path [default: $XDG_CONFIG_HOME/findable/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored log output (also honors NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Applies values given on the command line over `config`.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = usize::from(concurrency);
        }
        if let Some(secs) = self.probe_timeout {
            config.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.doi_metadata_timeout {
            config.doi.metadata_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.doi_resolver_timeout {
            config.doi.resolver_timeout = Duration::from_secs(secs);
        }
        if let Some(mailto) = &self.mailto {
            config.doi.mailto = Some(mailto.clone());
        }
    }

    /// Default log level from `-q` / `-v`.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Report rendering selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tab-separated table with every field
    Table,
    /// `identifier<TAB>score` per line
    Summary,
    /// JSON array of result records
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => Self::Table,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}
