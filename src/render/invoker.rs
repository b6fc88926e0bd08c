use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::job::{ConversionJob, JobFile};
use crate::error::{Error, Result};
use crate::shutdown::Shutdown;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Success,
    /// Renderer exited unsuccessfully; `None` when it was killed by a signal.
    Failed(Option<i32>),
    /// Shutdown was requested while waiting, the renderer was killed.
    Interrupted,
}

/// Runs the external renderer as `<command> -j <job file>`.
#[derive(Debug, Clone)]
pub struct Renderer {
    command: String,
    job_file: PathBuf,
}

impl Renderer {
    pub fn new(command: &str, job_file: &Path) -> Self {
        Renderer {
            command: command.to_string(),
            job_file: job_file.to_path_buf(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Write the job file, run the renderer to completion and remove the job
    /// file again. The job file is gone afterwards on every path out of here.
    pub fn convert(&self, job: &ConversionJob, shutdown: &Shutdown) -> Result<RenderOutcome> {
        let job_file = JobFile::create(&self.job_file, job)?;
        debug!(
            "Running {} -j {} for {}",
            self.command,
            job_file.path().display(),
            job.input_path.display()
        );

        let mut child = Command::new(&self.command)
            .arg("-j")
            .arg(job_file.path())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| Error::RendererSpawn {
                command: self.command.clone(),
                source,
            })?;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if shutdown.is_triggered() {
                warn!("Stopping renderer for {}", job.input_path.display());
                // it may have exited between try_wait and kill
                let _ = child.kill();
                child.wait()?;
                return Ok(RenderOutcome::Interrupted);
            }
            thread::sleep(POLL_INTERVAL);
        };

        if status.success() {
            Ok(RenderOutcome::Success)
        } else {
            warn!(
                "Renderer exited with {} for {}",
                status,
                job.input_path.display()
            );
            Ok(RenderOutcome::Failed(status.code()))
        }
    }
}
