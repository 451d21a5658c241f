//! CLI entry point for the findable tool.

use std::io::{self, IsTerminal, Read, Write};
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use findable_core::{
    Pipeline, PipelineConfig, parse_identifier_args, parse_identifier_list, write_failure_hints,
    write_report,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;
mod terminal;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let no_color = terminal::should_disable_color(args.no_color);
    terminal::init_tracing(args.default_log_level(), no_color);

    debug!(?args, "CLI arguments parsed");

    let loaded = app_config::load_config(args.config.as_deref())?;
    let mut config = PipelineConfig::default();
    if let Some(file_config) = &loaded.config {
        if let Some(path) = &loaded.path {
            debug!(path = %path.display(), "Loaded config file");
        }
        file_config.apply_to(&mut config)?;
    }
    args.apply_overrides(&mut config);

    let parse_result = if args.identifiers.is_empty() {
        let Some(input_text) = read_input(&args)? else {
            info!(
                "No input provided. Pass identifiers as arguments, use --input, or pipe via stdin."
            );
            info!("Example: echo '10.5061/dryad.4j0zpc8p9' | findable");
            return Ok(());
        };
        parse_identifier_list(&input_text)
    } else {
        parse_identifier_args(&args.identifiers)
    };
    for skipped in &parse_result.skipped {
        warn!(skipped = %skipped, "Skipped unusable input line");
    }
    if parse_result.is_empty() {
        info!("No identifiers found in input");
        return Ok(());
    }
    info!(
        identifiers = parse_result.len(),
        skipped = parse_result.skipped_count(),
        "Parsed input"
    );

    let pipeline = Pipeline::new(config).context("Failed to set up the findability pipeline")?;
    let total = parse_result.len();

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, stop) =
        progress::spawn_progress_ui(use_spinner, pipeline.stats(), total);

    let results = pipeline.run(parse_result.records).await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let mut stdout = io::stdout().lock();
    write_report(&mut stdout, &results, args.format.into()).context("Failed to write report")?;
    stdout.flush().context("Failed to flush report")?;
    drop(stdout);

    if !args.quiet {
        write_failure_hints(&mut io::stderr().lock(), &results)
            .context("Failed to write failure hints")?;
    }

    let findable = results.iter().filter(|r| r.is_findable()).count();
    info!(
        total = results.len(),
        findable,
        not_findable = results.len() - findable,
        "Findability check complete"
    );

    Ok(())
}

/// Reads identifier rows from `--input` or piped stdin.
fn read_input(args: &Args) -> Result<Option<String>> {
    if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        return Ok(Some(text));
    }
    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read identifiers from stdin")?;
        return Ok(Some(buffer));
    }
    Ok(None)
}
