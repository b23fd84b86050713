//! Pan/tilt mount drivers.
//!
//! A mount accepts absolute angle commands for both axes. The tracking loop
//! only relies on the [`PanTiltMount`] trait; the concrete driver is chosen at
//! startup from the configuration.

use crate::{Error, Result};
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Two-axis mount that accepts absolute angle commands
pub trait PanTiltMount {
    /// Command an absolute position in degrees
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered to the mount
    fn position(&mut self, x_angle: f64, y_angle: f64) -> Result<()>;

    /// Move to the mechanical center
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered to the mount
    fn center(&mut self) -> Result<()> {
        self.position(0.0, 0.0)
    }

    /// Close the connection to the mount. Further commands are not expected.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be closed cleanly
    fn release(&mut self) -> Result<()>;
}

impl<M: PanTiltMount + ?Sized> PanTiltMount for Box<M> {
    fn position(&mut self, x_angle: f64, y_angle: f64) -> Result<()> {
        (**self).position(x_angle, y_angle)
    }

    fn center(&mut self) -> Result<()> {
        (**self).center()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

/// Dry-run mount that records every command instead of moving hardware
#[derive(Debug, Default)]
pub struct SimulatedMount {
    commands: Vec<(f64, f64)>,
    released: bool,
}

impl SimulatedMount {
    /// Create a new simulated mount
    #[must_use]
    pub fn new() -> Self {
        info!("Using simulated mount, no hardware will move");
        Self::default()
    }

    /// All commanded positions in order
    #[must_use]
    pub fn commands(&self) -> &[(f64, f64)] {
        &self.commands
    }

    /// Last commanded position
    #[must_use]
    pub fn last_position(&self) -> Option<(f64, f64)> {
        self.commands.last().copied()
    }

    /// Whether the mount has been released
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl PanTiltMount for SimulatedMount {
    fn position(&mut self, x_angle: f64, y_angle: f64) -> Result<()> {
        if self.released {
            return Err(Error::Mount("Command sent to a released mount".to_string()));
        }
        debug!("Simulated mount position ({:.2}, {:.2})", x_angle, y_angle);
        self.commands.push((x_angle, y_angle));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

/// Mount driven by a line-oriented text protocol.
///
/// Each position command is written as `P <x> <y>\n` with two decimals and
/// release as `R\n`. The writer is flushed after every command so the command
/// is accepted before the loop moves on.
pub struct LineProtocolMount<W: Write> {
    writer: Option<W>,
}

impl<W: Write> LineProtocolMount<W> {
    /// Wrap an already opened byte sink
    pub const fn new(writer: W) -> Self {
        Self { writer: Some(writer) }
    }

    /// Give back the underlying writer, if the mount has not been released
    pub fn into_inner(mut self) -> Option<W> {
        self.writer.take()
    }

    fn send(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Mount("Command sent to a released mount".to_string()))?;

        writer
            .write_all(line.as_bytes())
            .map_err(|e| Error::Mount(format!("Failed to write command: {e}")))?;
        writer
            .flush()
            .map_err(|e| Error::Mount(format!("Failed to flush command: {e}")))?;

        Ok(())
    }
}

impl LineProtocolMount<std::fs::File> {
    /// Open a character device (e.g. a serial port exposed by the mount controller)
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened for writing
    pub fn open_device<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening mount device {}", path.display());

        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| Error::Mount(format!("Failed to open {}: {e}", path.display())))?;

        Ok(Self::new(file))
    }
}

impl<W: Write> PanTiltMount for LineProtocolMount<W> {
    fn position(&mut self, x_angle: f64, y_angle: f64) -> Result<()> {
        debug!("Mount position ({:.2}, {:.2})", x_angle, y_angle);
        self.send(&format!("P {x_angle:.2} {y_angle:.2}\n"))
    }

    fn release(&mut self) -> Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        let result = self.send("R\n");
        self.writer = None;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_mount_records_commands() {
        let mut mount = SimulatedMount::new();
        mount.center().unwrap();
        mount.position(12.5, -3.0).unwrap();

        assert_eq!(mount.commands(), &[(0.0, 0.0), (12.5, -3.0)]);
        assert_eq!(mount.last_position(), Some((12.5, -3.0)));
    }

    #[test]
    fn test_simulated_mount_rejects_after_release() {
        let mut mount = SimulatedMount::new();
        mount.release().unwrap();
        assert!(mount.is_released());
        assert!(mount.position(1.0, 1.0).is_err());
    }

    #[test]
    fn test_line_protocol_format() {
        let mut mount = LineProtocolMount::new(Vec::new());
        mount.center().unwrap();
        mount.position(-19.0, 7.456).unwrap();

        let written = String::from_utf8(mount.into_inner().unwrap()).unwrap();
        assert_eq!(written, "P 0.00 0.00\nP -19.00 7.46\n");
    }

    #[test]
    fn test_line_protocol_release_is_idempotent() {
        let mut mount = LineProtocolMount::new(Vec::new());
        mount.release().unwrap();
        mount.release().unwrap();
        assert!(mount.position(0.0, 0.0).is_err());
    }

    #[test]
    fn test_open_missing_device() {
        let result = LineProtocolMount::open_device("/nonexistent/mount-device");
        assert!(matches!(result, Err(Error::Mount(_))));
    }
}
