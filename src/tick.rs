//! Per-iteration scheduling tick.
//!
//! The tick is the only point where the loop yields. With a window open it also
//! services the window's event queue and reports the quit key.

use crate::{
    constants::{ESC_KEY_NUM, KEY_WAIT_TIME_MS},
    Error, Result,
};
use log::info;
use opencv::highgui;
use std::time::Duration;

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep looping
    Continue,
    /// The operator asked to stop
    Quit,
}

/// Bounded wait between loop iterations
pub trait Tick {
    /// Wait for at most `timeout` and report whether the loop should stop
    ///
    /// # Errors
    ///
    /// Returns an error if polling the input device fails
    fn tick(&mut self, timeout: Duration) -> Result<TickOutcome>;
}

impl<T: Tick + ?Sized> Tick for Box<T> {
    fn tick(&mut self, timeout: Duration) -> Result<TickOutcome> {
        (**self).tick(timeout)
    }
}

/// Default tick timeout
#[must_use]
pub const fn default_timeout() -> Duration {
    Duration::from_millis(KEY_WAIT_TIME_MS)
}

fn timeout_ms(timeout: Duration) -> i32 {
    // wait_key treats 0 as "forever"
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX).max(1)
}

/// Tick that polls the `HighGUI` key queue
#[derive(Debug, Clone, Copy)]
pub struct HighGuiTick {
    quit_key: i32,
}

impl HighGuiTick {
    /// Create a tick that quits on the given key code
    ///
    /// # Errors
    ///
    /// Returns an error if the key code does not fit in one byte
    pub fn new(quit_key: i32) -> Result<Self> {
        validate_quit_key(quit_key)?;
        Ok(Self { quit_key })
    }
}

impl Default for HighGuiTick {
    fn default() -> Self {
        Self { quit_key: ESC_KEY_NUM }
    }
}

/// Check that a quit key can be reported by `wait_key`.
///
/// Only the low byte of a key event is compared.
///
/// # Errors
///
/// Returns an error if the code is outside 0..=255
pub fn validate_quit_key(quit_key: i32) -> Result<()> {
    if !(0..=0xFF).contains(&quit_key) {
        return Err(Error::InvalidInput(format!(
            "Quit key must be a key code between 0 and 255, got {quit_key}"
        )));
    }
    Ok(())
}

impl Tick for HighGuiTick {
    fn tick(&mut self, timeout: Duration) -> Result<TickOutcome> {
        let key = highgui::wait_key(timeout_ms(timeout))?;
        if key >= 0 && (key & 0xFF) == self.quit_key {
            info!("Exit requested by user");
            return Ok(TickOutcome::Quit);
        }
        Ok(TickOutcome::Continue)
    }
}

/// Tick for headless runs: sleeps and never quits on its own
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepTick;

impl Tick for SleepTick {
    fn tick(&mut self, timeout: Duration) -> Result<TickOutcome> {
        std::thread::sleep(timeout);
        Ok(TickOutcome::Continue)
    }
}
