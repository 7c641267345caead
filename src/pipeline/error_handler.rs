use colored::Colorize;
use log::warn;

use crate::Summary;

/// Log a count of failed tasks and list each one on stderr. Call after the run returns.
/// Returns the failure count so the caller can pick an exit status.
pub fn report_failures(summary: &Summary) -> usize {
    if summary.failed == 0 {
        return 0;
    }
    warn!("{} of {} uploads failed", summary.failed, summary.total());
    for f in &summary.failures {
        eprintln!(
            "  {} {} ({}): {}",
            "failed:".red(),
            f.subject_name,
            f.file_path.display(),
            f.error
        );
    }
    summary.failed
}
