use clap::{Parser, Subcommand};
use musescore2pdf::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "musescore2pdf")]
#[command(
    about = "Watches a directory and converts musescore files in it to PDFs",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory to watch
    pub root: Option<String>,

    /// Seconds to wait between scans [default: 5]
    #[arg(short, long)]
    pub scan_interval_seconds: Option<u64>,

    /// Renderer executable [default: mscore]
    #[arg(short = 'm', long)]
    pub musescore: Option<String>,

    /// Fingerprint database file [default: musescore2pdf.db]
    #[arg(long)]
    pub db_path: Option<String>,

    /// Where to write the temporary renderer job file
    #[arg(long)]
    pub job_file: Option<String>,

    /// Run a single scan and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print configuration values
    PrintConfig,
    /// Display the number of fingerprints in the index
    CountIndex,
    /// Remove fingerprints of files that no longer exist
    PruneIndex,
    /// Delete every fingerprint so all files are converted again
    ClearIndex,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            scan_interval_seconds: self.scan_interval_seconds,
            musescore: self.musescore.clone(),
            db_path: self.db_path.clone(),
            job_file: self.job_file.clone(),
        }
    }
}
