use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::WatchContext;
use crate::error::{Error, Result};
use crate::index::{FingerprintIndex, FingerprintStatus};
use crate::progress::ScanReporter;
use crate::render::{ConversionJob, RenderOutcome, Renderer};
use crate::resolver;
use crate::scanner;
use crate::shutdown::Shutdown;

/// Why a file is being sent to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionReason {
    New,
    Changed,
    /// Content is known, but its output directory was just created empty.
    OutputDirCreated,
}

impl fmt::Display for ConversionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionReason::New => write!(f, "new"),
            ConversionReason::Changed => write!(f, "changed"),
            ConversionReason::OutputDirCreated => write!(f, "output directory created"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub discovered: usize,
    pub converted: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub ambiguous: usize,
    pub interrupted: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileResult {
    Unchanged,
    Converted(RenderOutcome),
}

/// Repeats scan cycles over the watched tree until shutdown.
#[derive(Debug)]
pub struct ScanEngine {
    context: WatchContext,
    index: FingerprintIndex,
    renderer: Renderer,
}

impl ScanEngine {
    pub fn new(context: WatchContext, index: FingerprintIndex) -> Self {
        let renderer = Renderer::new(&context.renderer, &context.job_file);
        ScanEngine {
            context,
            index,
            renderer,
        }
    }

    pub fn context(&self) -> &WatchContext {
        &self.context
    }

    pub fn index(&self) -> &FingerprintIndex {
        &self.index
    }

    /// Scan, then sleep for the configured interval, until `shutdown` fires.
    pub fn run(&self, reporter: &dyn ScanReporter, shutdown: &Shutdown) -> Result<()> {
        loop {
            self.run_cycle(reporter, shutdown)?;
            if shutdown.is_triggered() {
                break;
            }
            debug!(
                "Idle for {:.1}s",
                self.context.scan_interval.as_secs_f64()
            );
            if shutdown.wait_timeout(self.context.scan_interval) {
                break;
            }
        }
        Ok(())
    }

    /// One full pass over the watched tree. Per-file failures are reported and
    /// counted; only store failures end the cycle early with an error.
    pub fn run_cycle(&self, reporter: &dyn ScanReporter, shutdown: &Shutdown) -> Result<CycleReport> {
        let start = Instant::now();
        reporter.on_cycle_start(&self.context.root);

        let inputs = scanner::find_input_files(&self.context.root, &self.context.ignore_patterns);
        reporter.on_files_found(inputs.len());

        let mut report = CycleReport {
            discovered: inputs.len(),
            ..Default::default()
        };

        for input in &inputs {
            if shutdown.is_triggered() {
                report.interrupted = true;
                break;
            }
            match self.process_file(input, reporter, shutdown, &mut report) {
                Ok(FileResult::Unchanged) => report.unchanged += 1,
                Ok(FileResult::Converted(RenderOutcome::Success)) => report.converted += 1,
                Ok(FileResult::Converted(RenderOutcome::Failed(_))) => report.failed += 1,
                Ok(FileResult::Converted(RenderOutcome::Interrupted)) => {
                    report.interrupted = true;
                    break;
                }
                Err(err) if err.is_per_file() => {
                    reporter.on_file_error(input, &err);
                    report.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        report.duration = start.elapsed();
        reporter.on_cycle_complete(&report);
        Ok(report)
    }

    fn process_file(
        &self,
        input: &Path,
        reporter: &dyn ScanReporter,
        shutdown: &Shutdown,
        report: &mut CycleReport,
    ) -> Result<FileResult> {
        let song_dir = input
            .parent()
            .ok_or_else(|| Error::Other(format!("{} has no parent directory", input.display())))?;

        let location = resolver::resolve_output_dir(song_dir)?;
        if location.is_ambiguous() {
            report.ambiguous += 1;
        }

        // The hash check runs even when the output directory forces a render,
        // so the stored fingerprint always tracks the current content.
        let status = self.index.check(input)?;
        let reason = match status {
            FingerprintStatus::New => ConversionReason::New,
            FingerprintStatus::Changed => ConversionReason::Changed,
            FingerprintStatus::Unchanged if location.freshly_created => {
                ConversionReason::OutputDirCreated
            }
            FingerprintStatus::Unchanged => return Ok(FileResult::Unchanged),
        };

        reporter.on_conversion_start(input, reason);
        let job = ConversionJob::new(input, &location.path);
        let outcome = self.renderer.convert(&job, shutdown);

        // an interrupted render is always redone; other failures only on request
        let retry = match outcome {
            Ok(RenderOutcome::Success) => false,
            Ok(RenderOutcome::Interrupted) => true,
            _ => self.context.retry_failed_conversions,
        };
        if retry {
            self.index.forget(input)?;
            debug!("Will retry {} next cycle", input.display());
        }

        let outcome = outcome?;
        reporter.on_conversion_complete(input, outcome);
        Ok(FileResult::Converted(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use crate::storage::Database;
    use std::fs;
    use tempfile::tempdir;

    fn engine(root: &Path, renderer: &str) -> ScanEngine {
        let context = WatchContext::new(
            fs::canonicalize(root).unwrap(),
            renderer,
            root.join("job.json"),
        );
        let index = FingerprintIndex::new(Database::open_in_memory().unwrap()).unwrap();
        ScanEngine::new(context, index)
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempdir().unwrap();
        let engine = engine(dir.path(), "mscore-does-not-exist");
        let report = engine.run_cycle(&SilentReporter, &Shutdown::new()).unwrap();
        assert_eq!(report.discovered, 0);
        assert_eq!(report.converted, 0);
    }

    #[test]
    fn test_missing_renderer_is_per_file_failure() {
        let dir = tempdir().unwrap();
        let song_dir = dir.path().join("SongA");
        fs::create_dir(&song_dir).unwrap();
        fs::write(song_dir.join("song.mscz"), "score").unwrap();
        let engine = engine(dir.path(), "mscore-does-not-exist-anywhere");

        let report = engine.run_cycle(&SilentReporter, &Shutdown::new()).unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.failed, 1);
        assert!(song_dir.join("pdf").is_dir());
        // forgotten, so the next cycle tries again
        assert!(engine.index().is_empty().unwrap());
        assert!(!dir.path().join("job.json").exists());
    }

    #[test]
    fn test_failed_render_kept_when_retry_disabled() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mscz"), "score").unwrap();
        let mut engine = engine(dir.path(), "mscore-does-not-exist-anywhere");
        engine.context.retry_failed_conversions = false;

        engine.run_cycle(&SilentReporter, &Shutdown::new()).unwrap();
        assert_eq!(engine.index().len().unwrap(), 1);
    }

    #[test]
    fn test_shutdown_before_cycle_skips_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mscz"), "score").unwrap();
        let engine = engine(dir.path(), "mscore-does-not-exist");
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let report = engine.run_cycle(&SilentReporter, &shutdown).unwrap();
        assert!(report.interrupted);
        assert_eq!(report.discovered, 1);
        assert_eq!(report.unchanged + report.converted + report.failed, 0);
        assert!(engine.index().is_empty().unwrap());
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let engine = engine(dir.path(), "mscore-does-not-exist");
        let shutdown = Shutdown::new();
        shutdown.trigger();
        engine.run(&SilentReporter, &shutdown).unwrap();
    }
}
