use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::{Error, Result};

pub const OUTPUT_EXTENSION: &str = ".pdf";
/// Placed between the base name and whatever part/page numbering the renderer adds.
pub const OUTPUT_SEPARATOR: &str = "-";

/// One input file and where its PDF should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_base_name: String,
}

/// Entry of the renderer's batch job format: `{"in": ..., "out": [[prefix, suffix]]}`.
#[derive(Debug, Serialize)]
struct JobEntry {
    #[serde(rename = "in")]
    input: String,
    out: Vec<(String, String)>,
}

impl ConversionJob {
    pub fn new(input_path: &Path, output_dir: &Path) -> Self {
        let output_base_name = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        ConversionJob {
            input_path: input_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            output_base_name,
        }
    }

    /// `<output_dir>/<base name>-`; the renderer appends numbering and the suffix.
    pub fn output_prefix(&self) -> String {
        format!(
            "{}{}",
            self.output_dir.join(&self.output_base_name).to_string_lossy(),
            OUTPUT_SEPARATOR
        )
    }

    pub fn to_json(&self) -> Result<String> {
        let entries = [JobEntry {
            input: self.input_path.to_string_lossy().into_owned(),
            out: vec![(self.output_prefix(), OUTPUT_EXTENSION.to_string())],
        }];
        Ok(serde_json::to_string(&entries)?)
    }
}

/// The job file on disk. Removed when dropped, whatever happened in between.
#[derive(Debug)]
pub struct JobFile {
    path: PathBuf,
}

impl JobFile {
    pub fn create(path: &Path, job: &ConversionJob) -> Result<Self> {
        let json = job.to_json()?;
        // guard first, so a half-written file is removed too
        let file = JobFile {
            path: path.to_path_buf(),
        };
        fs::write(&file.path, json).map_err(|source| Error::JobFile {
            path: file.path.clone(),
            source,
        })?;
        debug!("Wrote job file {}", path.display());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => error!("Failed to remove job file {}: {}", self.path.display(), e),
        }
    }
}
