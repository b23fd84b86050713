//! Face tracking for a pan/tilt camera mount.
//!
//! This library keeps the largest visible face centered in the camera image by
//! steering a two-axis mount:
//! - `OpenCV` Haar cascades find faces, confirmed by at least one eye
//! - the largest face becomes the target
//! - its offset from the frame center becomes a proportional angle correction
//! - a damped, clamped correction is sent to the mount every frame
//!
//! # Examples
//!
//! ## Control path without hardware
//!
//! ```
//! use face_tracking_mount::{
//!     angle_mapping::AngleMapper,
//!     mount::SimulatedMount,
//!     target_selection::{select_target, target_center},
//!     tracking::{MountAngles, MountLimits, TrackingController},
//! };
//! use opencv::core::Rect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let limits = MountLimits::default();
//! let mapper = AngleMapper::new(480, 480, &limits)?;
//! let mut controller = TrackingController::new(SimulatedMount::new(), limits, MountAngles::home())?;
//!
//! let candidates = vec![Rect::new(300, 40, 60, 60), Rect::new(0, 0, 100, 100)];
//! if let Some(target) = select_target(&candidates) {
//!     let (cx, cy) = target_center(&target);
//!     let angles = controller.update(mapper.pixels_to_angle(cx, cy))?;
//!     assert!((angles.x - (-19.0)).abs() < 1e-6);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Full session
//!
//! ```no_run
//! use face_tracking_mount::{app::FaceTrackingApp, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("tracking.yaml")?;
//! let app = FaceTrackingApp::new(&config)?;
//! app.shutdown_signal().install_interrupt_handler()?;
//!
//! let summary = app.run()?;
//! println!("{} frames, stopped by {:?}", summary.frames_processed, summary.exit_reason);
//! # Ok(())
//! # }
//! ```

/// Face detection with eye confirmation
pub mod face_detection;

/// Choice of the tracking target
pub mod target_selection;

/// Pixel offset to angle correction
pub mod angle_mapping;

/// Angle state, damping and clamping
pub mod tracking;

/// Pan/tilt mount drivers
pub mod mount;

/// Camera and video file input
pub mod camera;

/// Detection box drawing
pub mod annotation;

/// Preview window and video recording
pub mod sinks;

/// Loop scheduling tick
pub mod tick;

/// Interrupt driven cancellation
pub mod shutdown;

/// Per-frame tracking loop
pub mod frame_loop;

/// Main application module
pub mod app;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
