use config::{Config, ConfigError, Environment, File as ConfigFile};
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Error, Result};

pub const DEFAULT_SCAN_INTERVAL_SECONDS: u64 = 5;
pub const DEFAULT_RENDERER: &str = "mscore";
pub const DEFAULT_DB_PATH: &str = "musescore2pdf.db";
pub const DEFAULT_JOB_FILE_NAME: &str = "musescore2pdf-job.json";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub root: Option<String>,
    pub scan_interval_seconds: u64,
    pub musescore: String,
    pub db_path: String,
    pub job_file: Option<String>,
    pub ignore_patterns: Vec<String>,
    pub retry_failed_conversions: bool,
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub root: Option<String>,
    pub scan_interval_seconds: Option<u64>,
    pub musescore: Option<String>,
    pub db_path: Option<String>,
    pub job_file: Option<String>,
}

pub fn load_configuration(overrides: &ConfigOverrides) -> std::result::Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("scan_interval_seconds", DEFAULT_SCAN_INTERVAL_SECONDS as i64)?
        .set_default("musescore", DEFAULT_RENDERER)?
        .set_default("db_path", DEFAULT_DB_PATH)?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("retry_failed_conversions", true)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("MUSESCORE2PDF")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .set_override_option("root", overrides.root.clone())?
        .set_override_option(
            "scan_interval_seconds",
            overrides.scan_interval_seconds.map(|s| s as i64),
        )?
        .set_override_option("musescore", overrides.musescore.clone())?
        .set_override_option("db_path", overrides.db_path.clone())?
        .set_override_option("job_file", overrides.job_file.clone())?
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Everything a scan cycle needs, resolved once at startup and passed by
/// reference from there on.
#[derive(Debug, Clone)]
pub struct WatchContext {
    pub root: PathBuf,
    pub scan_interval: Duration,
    pub renderer: String,
    pub job_file: PathBuf,
    pub ignore_patterns: Vec<Pattern>,
    pub retry_failed_conversions: bool,
}

impl WatchContext {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let root = config
            .root
            .as_deref()
            .ok_or_else(|| Error::Other("No root directory to watch was given".to_string()))?;
        let root = fs::canonicalize(root)
            .map_err(|e| Error::Other(format!("Cannot watch '{}': {}", root, e)))?;
        if !root.is_dir() {
            return Err(Error::Other(format!(
                "Cannot watch '{}': not a directory",
                root.display()
            )));
        }

        let job_file = config
            .job_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_JOB_FILE_NAME));
        debug!("Using '{}' as renderer job file", job_file.display());

        Ok(WatchContext {
            root,
            scan_interval: Duration::from_secs(config.scan_interval_seconds),
            renderer: config.musescore.clone(),
            job_file,
            ignore_patterns: compile_patterns(&config.ignore_patterns),
            retry_failed_conversions: config.retry_failed_conversions,
        })
    }

    /// A context with default settings, mostly useful for tests and embedding.
    pub fn new(root: PathBuf, renderer: &str, job_file: PathBuf) -> Self {
        WatchContext {
            root,
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECONDS),
            renderer: renderer.to_string(),
            job_file,
            ignore_patterns: Vec::new(),
            retry_failed_conversions: true,
        }
    }
}

fn compile_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}
