//! Progress UI (spinner) for findability runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use findable_core::PipelineStats;
use indicatif::{ProgressBar, ProgressStyle};

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    stats: Arc<PipelineStats>,
    total: usize,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(stats, total, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    stats: Arc<PipelineStats>,
    total: usize,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(progress_message(&stats, total));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

fn progress_message(stats: &PipelineStats, total: usize) -> String {
    let finished = stats.finished().min(total);
    let phase = if stats.resolved() + stats.unresolved() < total {
        "Resolving"
    } else {
        "Probing"
    };
    format!(
        "[{finished}/{total}] {phase} identifiers... ({} findable)",
        stats.findable()
    )
}

#[cfg(test)]
mod tests {
    use super::{progress_message, spawn_progress_ui};
    use findable_core::PipelineStats;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn spawn_progress_ui_when_disabled_returns_none_handle_and_stop_already_true() {
        let (handle, stop) = spawn_progress_ui(false, Arc::new(PipelineStats::new()), 1);

        assert!(handle.is_none());
        assert!(
            stop.load(Ordering::SeqCst),
            "stop signal should be true when spinner disabled"
        );
    }

    #[tokio::test]
    async fn spawn_progress_ui_when_enabled_returns_handle_and_stop_ends_task() {
        let (handle, stop) = spawn_progress_ui(true, Arc::new(PipelineStats::new()), 1);

        assert!(handle.is_some(), "handle should be Some when spinner enabled");
        assert!(!stop.load(Ordering::SeqCst), "stop should be false initially");

        stop.store(true, Ordering::SeqCst);
        let _ = handle.unwrap().await;
    }

    #[test]
    fn progress_message_starts_in_resolving_phase() {
        let stats = PipelineStats::new();
        assert_eq!(
            progress_message(&stats, 3),
            "[0/3] Resolving identifiers... (0 findable)"
        );
    }
}
