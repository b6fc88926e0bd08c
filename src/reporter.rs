use colored::*;
use musescore2pdf::engine::{ConversionReason, CycleReport};
use musescore2pdf::render::RenderOutcome;
use musescore2pdf::{Error, ScanReporter};
use std::path::Path;
use tracing::{debug, error, info};

/// Reports scan progress through tracing.
pub struct LogReporter;

impl ScanReporter for LogReporter {
    fn on_cycle_start(&self, root: &Path) {
        debug!("Scanning {}", root.display());
    }

    fn on_files_found(&self, count: usize) {
        info!("Scanning found {} musescore file(s)", count);
    }

    fn on_conversion_start(&self, input: &Path, reason: ConversionReason) {
        info!(
            "Regenerating PDFs for {} ({})",
            input.display().to_string().cyan(),
            reason
        );
    }

    fn on_conversion_complete(&self, input: &Path, outcome: RenderOutcome) {
        debug!("Renderer finished for {}: {:?}", input.display(), outcome);
    }

    fn on_file_error(&self, input: &Path, error: &Error) {
        error!("Skipping {}: {}", input.display(), error);
    }

    fn on_cycle_complete(&self, report: &CycleReport) {
        if report.converted + report.failed == 0 {
            debug!(
                "Nothing to do ({} unchanged) in {:.2}s",
                report.unchanged,
                report.duration.as_secs_f64()
            );
            return;
        }
        info!(
            "{} converted, {} unchanged, {} failed in {}",
            format!("{}", report.converted).green(),
            report.unchanged,
            format!("{}", report.failed).red(),
            format!("{:.2}s", report.duration.as_secs_f64()).green(),
        );
    }
}
