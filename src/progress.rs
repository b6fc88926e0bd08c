use std::path::Path;

use crate::engine::{ConversionReason, CycleReport};
use crate::error::Error;
use crate::render::RenderOutcome;

/// Trait for reporting scan progress.
///
/// The binary implements this with tracing; tests and embedders can use
/// `SilentReporter`. All methods have default no-op implementations.
pub trait ScanReporter {
    fn on_cycle_start(&self, _root: &Path) {}
    fn on_files_found(&self, _count: usize) {}
    fn on_conversion_start(&self, _input: &Path, _reason: ConversionReason) {}
    fn on_conversion_complete(&self, _input: &Path, _outcome: RenderOutcome) {}
    fn on_file_error(&self, _input: &Path, _error: &Error) {}
    fn on_cycle_complete(&self, _report: &CycleReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}
