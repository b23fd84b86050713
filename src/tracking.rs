//! Closed-loop tracking controller.
//!
//! The controller keeps the absolute mount angles for the session, integrates
//! damped corrections into them, saturates each axis at its mechanical limits
//! and forwards the result to the mount.

use crate::{
    angle_mapping::AngleDelta,
    constants::{
        DAMPING_GAIN, HOME_X_ANGLE, HOME_Y_ANGLE, MAX_X_CAMERA_ANGLE, MAX_Y_CAMERA_ANGLE, MIN_X_CAMERA_ANGLE,
        MIN_Y_CAMERA_ANGLE,
    },
    mount::PanTiltMount,
    Error, Result,
};
use log::{debug, info, warn};

/// Travel range of one axis (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    /// Lowest reachable angle
    pub min: f64,
    /// Highest reachable angle
    pub max: f64,
}

impl AxisLimits {
    /// Create axis limits
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Total travel of the axis
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Saturate a value to the axis range
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Whether a value lies inside the range
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Travel ranges of both mount axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountLimits {
    /// Pan axis
    pub x: AxisLimits,
    /// Tilt axis
    pub y: AxisLimits,
}

impl Default for MountLimits {
    fn default() -> Self {
        Self {
            x: AxisLimits::new(MIN_X_CAMERA_ANGLE, MAX_X_CAMERA_ANGLE),
            y: AxisLimits::new(MIN_Y_CAMERA_ANGLE, MAX_Y_CAMERA_ANGLE),
        }
    }
}

impl MountLimits {
    /// Check that both axes have a non-empty finite range
    ///
    /// # Errors
    ///
    /// Returns an error if an axis is inverted or not finite
    pub fn validate(&self) -> Result<()> {
        for (name, axis) in [("x", self.x), ("y", self.y)] {
            if !axis.min.is_finite() || !axis.max.is_finite() || axis.min >= axis.max {
                return Err(Error::InvalidInput(format!(
                    "Invalid {name} axis limits [{}, {}]",
                    axis.min, axis.max
                )));
            }
        }
        Ok(())
    }

    /// Saturate both axes
    #[must_use]
    pub fn clamp(&self, angles: MountAngles) -> MountAngles {
        MountAngles {
            x: self.x.clamp(angles.x),
            y: self.y.clamp(angles.y),
        }
    }

    /// Whether both axes are inside their range
    #[must_use]
    pub fn contains(&self, angles: MountAngles) -> bool {
        self.x.contains(angles.x) && self.y.contains(angles.y)
    }
}

/// Absolute mount angles (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MountAngles {
    /// Pan angle
    pub x: f64,
    /// Tilt angle
    pub y: f64,
}

impl MountAngles {
    /// Create a new angle pair
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Default home position
    #[must_use]
    pub const fn home() -> Self {
        Self::new(HOME_X_ANGLE, HOME_Y_ANGLE)
    }
}

/// Integrate one damped correction and saturate the result.
#[must_use]
pub fn integrate(state: MountAngles, delta: AngleDelta, gain: f64, limits: &MountLimits) -> MountAngles {
    limits.clamp(MountAngles {
        x: state.x + delta.x * gain,
        y: state.y + delta.y * gain,
    })
}

/// Check that a damping gain is finite and positive
///
/// # Errors
///
/// Returns an error for zero, negative or non-finite gains
pub fn validate_gain(gain: f64) -> Result<()> {
    if !gain.is_finite() || gain <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Damping gain must be positive, got {gain}"
        )));
    }
    Ok(())
}

/// Owns the mount and the angle state of a tracking session
pub struct TrackingController<M: PanTiltMount> {
    mount: M,
    limits: MountLimits,
    gain: f64,
    home: MountAngles,
    angles: MountAngles,
    released: bool,
}

impl<M: PanTiltMount> TrackingController<M> {
    /// Create a controller with the default gain
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are invalid or home lies outside them
    pub fn new(mount: M, limits: MountLimits, home: MountAngles) -> Result<Self> {
        Self::with_gain(mount, limits, home, DAMPING_GAIN)
    }

    /// Create a controller with an explicit damping gain
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are invalid, home lies outside them or
    /// the gain is not positive
    pub fn with_gain(mount: M, limits: MountLimits, home: MountAngles, gain: f64) -> Result<Self> {
        limits.validate()?;
        if !limits.contains(home) {
            return Err(Error::InvalidInput(format!(
                "Home position ({}, {}) is outside the mount limits",
                home.x, home.y
            )));
        }
        validate_gain(gain)?;

        Ok(Self {
            mount,
            limits,
            gain,
            home,
            angles: home,
            released: false,
        })
    }

    /// Reset the state to home and command the mount there
    ///
    /// # Errors
    ///
    /// Returns an error if the mount rejects the command
    pub fn home(&mut self) -> Result<MountAngles> {
        info!("Moving mount to home position ({:.2}, {:.2})", self.home.x, self.home.y);
        self.angles = self.home;
        self.mount.position(self.angles.x, self.angles.y)?;
        Ok(self.angles)
    }

    /// Apply one correction and command the new position.
    ///
    /// Non-finite deltas are ignored so the state never leaves the limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount rejects the command
    pub fn update(&mut self, delta: AngleDelta) -> Result<MountAngles> {
        if !delta.x.is_finite() || !delta.y.is_finite() {
            warn!("Ignoring non-finite correction ({}, {})", delta.x, delta.y);
            return Ok(self.angles);
        }

        self.angles = integrate(self.angles, delta, self.gain, &self.limits);
        self.mount.position(self.angles.x, self.angles.y)?;

        debug!("delta ({:.2}, {:.2})", delta.x, delta.y);
        debug!("camera ({:.2}, {:.2})", self.angles.x, self.angles.y);

        Ok(self.angles)
    }

    /// Current angle state
    #[must_use]
    pub const fn angles(&self) -> MountAngles {
        self.angles
    }

    /// Configured limits
    #[must_use]
    pub const fn limits(&self) -> &MountLimits {
        &self.limits
    }

    /// Access the mount
    pub const fn mount(&self) -> &M {
        &self.mount
    }

    /// Release the mount connection. The mount keeps its last position.
    ///
    /// # Errors
    ///
    /// Returns an error if the mount fails to close
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        info!("Releasing mount at ({:.2}, {:.2})", self.angles.x, self.angles.y);
        self.mount.release()
    }
}

impl<M: PanTiltMount> Drop for TrackingController<M> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release mount: {}", e);
        }
    }
}
