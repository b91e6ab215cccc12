//! CLI output formatting for progress events and the final summary.
//!
//! Each concern has a pure `format_*` function (returns strings, no I/O) so
//! the exact lines are unit-testable; the binary owns the printing. Ticks are
//! deliberately not formatted as lines — a terminal log that grows by one row
//! per second is noise, and the final summary carries the elapsed time.

use crate::batch::SkippedImage;
use crate::progress::ProgressEvent;

/// Format one progress event as a display line, or `None` for events the CLI
/// does not print (ticks, and the final event which the summary covers).
pub fn format_progress_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Started { total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            Some(format!("Processing {total} {noun}"))
        }
        ProgressEvent::ImageCompleted {
            name,
            completed,
            total,
        } => Some(format!("  [{completed}/{total}] {name}")),
        ProgressEvent::ImageSkipped { name, reason } => Some(format!("  skipped {name}: {reason}")),
        ProgressEvent::Tick { .. } | ProgressEvent::Finished { .. } => None,
    }
}

/// Format the end-of-batch summary.
pub fn format_summary(
    completed: usize,
    skipped: &[SkippedImage],
    elapsed: &str,
    deliverable: Option<&str>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let noun = if completed == 1 { "image" } else { "images" };
    lines.push(format!("Compressed {completed} {noun} in {elapsed}"));
    for skip in skipped {
        lines.push(format!("  skipped {}: {}", skip.name, skip.reason));
    }
    if let Some(name) = deliverable {
        lines.push(format!("Saved {name}"));
    }
    lines
}
