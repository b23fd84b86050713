//! Conversion from a pixel position to a proportional angular correction.

use crate::{tracking::MountLimits, Error, Result};

/// Angular correction for both axes (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleDelta {
    /// Pan correction
    pub x: f64,
    /// Tilt correction
    pub y: f64,
}

impl AngleDelta {
    /// Create a new delta
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps a target center to the correction that would bring it to the frame center.
///
/// The horizontal and vertical field of view are taken to be the full travel of
/// the respective mount axis. Rows grow downward while tilt grows upward, so the
/// vertical correction is negated.
#[derive(Debug, Clone, Copy)]
pub struct AngleMapper {
    frame_width: f64,
    frame_height: f64,
    x_span: f64,
    y_span: f64,
}

impl AngleMapper {
    /// Create a mapper for the given frame size and mount limits
    ///
    /// # Errors
    ///
    /// Returns an error if the frame size is not positive or an axis has no travel
    pub fn new(frame_width: i32, frame_height: i32, limits: &MountLimits) -> Result<Self> {
        if frame_width <= 0 || frame_height <= 0 {
            return Err(Error::InvalidInput(format!(
                "Frame size must be positive, got {frame_width}x{frame_height}"
            )));
        }

        let x_span = limits.x.span();
        let y_span = limits.y.span();
        if x_span <= 0.0 || y_span <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Mount axes need a positive range, got x={x_span} y={y_span}"
            )));
        }

        Ok(Self {
            frame_width: f64::from(frame_width),
            frame_height: f64::from(frame_height),
            x_span,
            y_span,
        })
    }

    /// Convert a pixel position to the angular correction that centers it
    #[must_use]
    pub fn pixels_to_angle(&self, cx: i32, cy: i32) -> AngleDelta {
        let x = (f64::from(cx) - self.frame_width / 2.0) / (self.frame_width / self.x_span);
        let y = -(f64::from(cy) - self.frame_height / 2.0) / (self.frame_height / self.y_span);
        AngleDelta { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::AxisLimits;
    use proptest::prelude::*;

    fn default_mapper() -> AngleMapper {
        AngleMapper::new(480, 480, &MountLimits::default()).unwrap()
    }

    #[test]
    fn test_center_maps_to_zero() {
        let delta = default_mapper().pixels_to_angle(240, 240);
        assert_eq!(delta, AngleDelta::new(0.0, 0.0));
    }

    #[test]
    fn test_reference_target() {
        // Target (0, 0, 100, 100) has its center at (50, 50)
        let delta = default_mapper().pixels_to_angle(50, 50);
        assert!((delta.x - (-63.333_333)).abs() < 1e-3);
        assert!((delta.y - 63.333_333).abs() < 1e-3);
    }

    #[test]
    fn test_edges_map_to_half_span() {
        let mapper = default_mapper();
        assert!((mapper.pixels_to_angle(480, 240).x - 80.0).abs() < 1e-9);
        assert!((mapper.pixels_to_angle(0, 240).x + 80.0).abs() < 1e-9);
        assert!((mapper.pixels_to_angle(240, 0).y - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_odd_frame_center_is_fractional() {
        let mapper = AngleMapper::new(5, 5, &MountLimits::default()).unwrap();
        // Pixel 2 is half a pixel left of the center at 2.5
        let delta = mapper.pixels_to_angle(2, 2);
        assert!(delta.x < 0.0);
        assert!(delta.y > 0.0);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(AngleMapper::new(0, 480, &MountLimits::default()).is_err());
        assert!(AngleMapper::new(480, -1, &MountLimits::default()).is_err());

        let flat = MountLimits {
            x: AxisLimits::new(10.0, 10.0),
            y: AxisLimits::new(-80.0, 80.0),
        };
        assert!(AngleMapper::new(480, 480, &flat).is_err());
    }

    proptest! {
        #[test]
        fn prop_frame_center_is_zero(
            half_w in 1..2000i32,
            half_h in 1..2000i32,
            min in -180.0..0.0f64,
            span in 1.0..360.0f64,
        ) {
            let limits = MountLimits {
                x: AxisLimits::new(min, min + span),
                y: AxisLimits::new(min, min + span),
            };
            let mapper = AngleMapper::new(half_w * 2, half_h * 2, &limits).unwrap();
            let delta = mapper.pixels_to_angle(half_w, half_h);
            prop_assert!(delta.x.abs() < 1e-9);
            prop_assert!(delta.y.abs() < 1e-9);
        }

        #[test]
        fn prop_vertical_sign_is_inverted(
            (height, cy) in (1..2000i32).prop_flat_map(|h| (Just(h), 0..=h)),
            width in 1..2000i32,
            cx in 0..2000i32,
            y_min in -180.0..0.0f64,
            y_span in 1.0..360.0f64,
            x_min in -180.0..0.0f64,
            x_span in 1.0..360.0f64,
        ) {
            let limits = MountLimits {
                x: AxisLimits::new(x_min, x_min + x_span),
                y: AxisLimits::new(y_min, y_min + y_span),
            };
            let delta = AngleMapper::new(width, height, &limits).unwrap().pixels_to_angle(cx, cy);
            let offset = f64::from(cy) - f64::from(height) / 2.0;
            if offset > 0.0 {
                prop_assert!(delta.y < 0.0);
            } else if offset < 0.0 {
                prop_assert!(delta.y > 0.0);
            } else {
                prop_assert!(delta.y.abs() < 1e-12);
            }
        }
    }
}
