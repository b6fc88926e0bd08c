use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Job serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error reading {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error preparing output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing job file {}: {source}", path.display())]
    JobFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start renderer '{command}': {source}")]
    RendererSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Errors that only concern a single input file. The scan cycle logs these
    /// and moves on to the next file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. }
                | Error::OutputDir { .. }
                | Error::JobFile { .. }
                | Error::RendererSpawn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
