pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod index;
pub mod progress;
pub mod render;
pub mod resolver;
pub mod scanner;
pub mod shutdown;
pub mod storage;

pub use config::{AppConfig, WatchContext};
pub use engine::{ConversionReason, CycleReport, ScanEngine};
pub use error::Error;
pub use index::{FingerprintIndex, FingerprintStatus};
pub use progress::{ScanReporter, SilentReporter};
pub use shutdown::Shutdown;
