//! Cancellation flag raised by an operator interrupt.

use crate::{Error, Result};
use log::{info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Exit status used when a second interrupt forces the process down
const INTERRUPT_EXIT_CODE: i32 = 130;

/// Shared flag checked by the frame loop at every iteration boundary
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a flag that is not yet raised
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Raise the flag when the process receives Ctrl-C.
    ///
    /// A background thread waits for the signal on a single-threaded runtime.
    /// The first Ctrl-C asks the loop to stop and tear down. A second one
    /// exits the process immediately with status 130.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or the watcher thread cannot be created
    pub fn install_interrupt_handler(&self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Signal(format!("Failed to build signal runtime: {e}")))?;

        let signal = self.clone();
        std::thread::Builder::new()
            .name("interrupt-watcher".to_string())
            .spawn(move || {
                runtime.block_on(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for interrupt: {}", e);
                        return;
                    }
                    info!("Interrupt received, stopping after the current frame");
                    signal.request();

                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Second interrupt received, exiting without teardown");
                        std::process::exit(INTERRUPT_EXIT_CODE);
                    }
                });
            })
            .map_err(|e| Error::Signal(format!("Failed to spawn interrupt watcher: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_shared_between_clones() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_requested());

        signal.request();
        assert!(clone.is_requested());
    }

    #[test]
    fn test_request_from_another_thread() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        std::thread::spawn(move || remote.request()).join().unwrap();
        assert!(signal.is_requested());
    }
}
