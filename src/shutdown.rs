use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const TICK: Duration = Duration::from_millis(100);

/// Shared stop flag, set by Ctrl+C / SIGTERM and polled by the scan loop.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the process-wide interrupt handler. Can only be done once per
    /// process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let shutdown = Self::new();
        let handle = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, shutting down...");
            handle.trigger();
        })?;
        Ok(shutdown)
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on shutdown. Returns true when
    /// shutdown was requested.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while !self.is_triggered() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(TICK.min(deadline - now));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_runs_full_interval() {
        let shutdown = Shutdown::new();
        let start = Instant::now();
        assert!(!shutdown.wait_timeout(Duration::from_millis(150)));
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_trigger_wakes_waiter() {
        let shutdown = Shutdown::new();
        let handle = shutdown.clone();
        let waiter = thread::spawn(move || handle.wait_timeout(Duration::from_secs(60)));
        thread::sleep(Duration::from_millis(50));
        shutdown.trigger();
        assert!(waiter.join().unwrap());
    }
}
