//! Configuration management for the face tracking application

use crate::{
    annotation::AnnotationStyle,
    constants::{
        DAMPING_GAIN, ESC_KEY_NUM, EYE_CASCADE_FILE, EYE_MIN_NEIGHBORS, EYE_MIN_SIZE, EYE_SCALE_FACTOR,
        FACE_CASCADE_FILE, FACE_MIN_NEIGHBORS, FACE_MIN_SIZE, FACE_RECT_COLOR, FACE_SCALE_FACTOR, HOME_X_ANGLE,
        HOME_Y_ANGLE, KEY_WAIT_TIME_MS, MAX_CAMERA_READ_FAILURES, MAX_X_CAMERA_ANGLE, MAX_Y_CAMERA_ANGLE, MIN_X_CAMERA_ANGLE,
        MIN_Y_CAMERA_ANGLE, MOUNT_SETTLE_MS, OUTPUT_VIDEO_FILE, RECT_THICKNESS, STREAMING_HEIGHT, STREAMING_WIDTH,
        TARGET_RECT_COLOR, VIDEO_FOURCC, VIDEO_FRAMERATE, WINDOW_TITLE,
    },
    face_detection::DetectionParams,
    frame_loop::LoopSettings,
    sinks::RecordingSettings,
    tick::validate_quit_key,
    tracking::{validate_gain, AxisLimits, MountAngles, MountLimits},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier model paths
    pub models: ModelConfig,

    /// Camera streaming configuration
    pub stream: StreamConfig,

    /// Mount driver and limits
    pub mount: MountConfig,

    /// Tracking feedback configuration
    pub tracking: TrackingConfig,

    /// Face and eye detection parameters
    pub detection: DetectionConfig,

    /// Preview window configuration
    pub display: DisplayConfig,

    /// Output video configuration
    pub recording: RecordingConfig,
}

/// Classifier file paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Haar cascade for frontal faces
    pub face_cascade: PathBuf,

    /// Haar cascade for eyes
    pub eye_cascade: PathBuf,
}

/// Streaming resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Camera index used when no video file is given
    pub camera_index: i32,

    /// Video file to read instead of a camera
    pub video_file: Option<String>,

    /// Frame width in pixels
    pub width: i32,

    /// Frame height in pixels
    pub height: i32,

    /// Consecutive failed camera reads tolerated before giving up
    pub max_read_failures: u32,
}

/// Mount driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountDriver {
    /// Log commands without moving hardware
    Simulated,
    /// Write line protocol commands to a character device
    Device,
}

/// Mount configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Which driver to use
    pub driver: MountDriver,

    /// Character device for the `device` driver
    pub device: PathBuf,

    /// Pan axis lower limit (degrees)
    pub min_x: f64,

    /// Pan axis upper limit (degrees)
    pub max_x: f64,

    /// Tilt axis lower limit (degrees)
    pub min_y: f64,

    /// Tilt axis upper limit (degrees)
    pub max_y: f64,

    /// Pan home position (degrees)
    pub home_x: f64,

    /// Tilt home position (degrees)
    pub home_y: f64,

    /// Wait after homing before streaming (ms)
    pub settle_ms: u64,
}

/// Feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Fraction of each correction applied per frame
    pub gain: f64,
}

/// Detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Face cascade scale factor
    pub scale_factor: f64,

    /// Face cascade minimum neighbors
    pub min_neighbors: i32,

    /// Smallest face side (pixels)
    pub min_face_size: i32,

    /// Eye cascade scale factor
    pub eye_scale_factor: f64,

    /// Eye cascade minimum neighbors
    pub eye_min_neighbors: i32,

    /// Smallest eye side (pixels)
    pub min_eye_size: i32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the annotated stream in a window
    pub show: bool,

    /// Window title
    pub window_title: String,

    /// Candidate box color (BGR)
    pub face_color: [u8; 3],

    /// Target box color (BGR)
    pub target_color: [u8; 3],

    /// Box line thickness
    pub thickness: i32,

    /// Key poll timeout per frame (ms)
    pub key_wait_ms: u64,

    /// Key code that stops tracking
    pub quit_key: i32,
}

/// Recording configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Write the annotated stream to a file
    pub enabled: bool,

    /// Output file
    pub output: PathBuf,

    /// Four character codec code
    pub fourcc: String,

    /// Container frame rate
    pub fps: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_cascade: PathBuf::from(FACE_CASCADE_FILE),
            eye_cascade: PathBuf::from(EYE_CASCADE_FILE),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            video_file: None,
            width: STREAMING_WIDTH,
            height: STREAMING_HEIGHT,
            max_read_failures: MAX_CAMERA_READ_FAILURES,
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            driver: MountDriver::Simulated,
            device: PathBuf::from("/dev/ttyACM0"),
            min_x: MIN_X_CAMERA_ANGLE,
            max_x: MAX_X_CAMERA_ANGLE,
            min_y: MIN_Y_CAMERA_ANGLE,
            max_y: MAX_Y_CAMERA_ANGLE,
            home_x: HOME_X_ANGLE,
            home_y: HOME_Y_ANGLE,
            settle_ms: MOUNT_SETTLE_MS,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { gain: DAMPING_GAIN }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            scale_factor: FACE_SCALE_FACTOR,
            min_neighbors: FACE_MIN_NEIGHBORS,
            min_face_size: FACE_MIN_SIZE,
            eye_scale_factor: EYE_SCALE_FACTOR,
            eye_min_neighbors: EYE_MIN_NEIGHBORS,
            min_eye_size: EYE_MIN_SIZE,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show: true,
            window_title: WINDOW_TITLE.to_string(),
            face_color: FACE_RECT_COLOR,
            target_color: TARGET_RECT_COLOR,
            thickness: RECT_THICKNESS,
            key_wait_ms: KEY_WAIT_TIME_MS,
            quit_key: ESC_KEY_NUM,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: PathBuf::from(OUTPUT_VIDEO_FILE),
            fourcc: VIDEO_FOURCC.to_string(),
            fps: VIDEO_FRAMERATE,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Mount travel limits
    #[must_use]
    pub const fn mount_limits(&self) -> MountLimits {
        MountLimits {
            x: AxisLimits::new(self.mount.min_x, self.mount.max_x),
            y: AxisLimits::new(self.mount.min_y, self.mount.max_y),
        }
    }

    /// Mount home position
    #[must_use]
    pub const fn home(&self) -> MountAngles {
        MountAngles::new(self.mount.home_x, self.mount.home_y)
    }

    /// Detector parameters
    #[must_use]
    pub const fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.detection.scale_factor,
            min_neighbors: self.detection.min_neighbors,
            min_face_size: self.detection.min_face_size,
            eye_scale_factor: self.detection.eye_scale_factor,
            eye_min_neighbors: self.detection.eye_min_neighbors,
            min_eye_size: self.detection.min_eye_size,
        }
    }

    /// Annotation colors and thickness
    #[must_use]
    pub const fn annotation_style(&self) -> AnnotationStyle {
        AnnotationStyle {
            face_color: self.display.face_color,
            target_color: self.display.target_color,
            thickness: self.display.thickness,
        }
    }

    /// Loop timing and geometry
    #[must_use]
    pub const fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            width: self.stream.width,
            height: self.stream.height,
            settle_time: Duration::from_millis(self.mount.settle_ms),
            tick_timeout: Duration::from_millis(self.display.key_wait_ms),
        }
    }

    /// Output video settings
    #[must_use]
    pub fn recording_settings(&self) -> RecordingSettings {
        RecordingSettings {
            path: self.recording.output.clone(),
            fourcc: self.recording.fourcc.clone(),
            fps: self.recording.fps,
            width: self.stream.width,
            height: self.stream.height,
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<()> {
        if self.stream.width <= 0 || self.stream.height <= 0 {
            return Err(Error::ConfigError(format!(
                "Streaming resolution must be positive, got {}x{}",
                self.stream.width, self.stream.height
            )));
        }

        if self.stream.max_read_failures == 0 {
            return Err(Error::ConfigError("stream.max_read_failures must be at least 1".to_string()));
        }

        let limits = self.mount_limits();
        limits
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        if !limits.contains(self.home()) {
            return Err(Error::ConfigError(format!(
                "Home position ({}, {}) is outside the mount limits",
                self.mount.home_x, self.mount.home_y
            )));
        }

        validate_gain(self.tracking.gain).map_err(|e| Error::ConfigError(e.to_string()))?;

        if self.detection.scale_factor <= 1.0 || self.detection.eye_scale_factor <= 1.0 {
            return Err(Error::ConfigError("Cascade scale factors must be greater than 1.0".to_string()));
        }
        if self.detection.min_neighbors < 0 || self.detection.eye_min_neighbors < 0 {
            return Err(Error::ConfigError("Minimum neighbors must not be negative".to_string()));
        }
        if self.detection.min_face_size <= 0 || self.detection.min_eye_size <= 0 {
            return Err(Error::ConfigError("Minimum detection sizes must be positive".to_string()));
        }

        if self.display.thickness <= 0 {
            return Err(Error::ConfigError("Rectangle thickness must be positive".to_string()));
        }
        validate_quit_key(self.display.quit_key).map_err(|e| Error::ConfigError(e.to_string()))?;

        if self.recording.enabled {
            if !(self.recording.fps.is_finite() && self.recording.fps > 0.0) {
                return Err(Error::ConfigError("Recording frame rate must be positive".to_string()));
            }
            if self.recording.fourcc.chars().count() != 4 {
                return Err(Error::ConfigError(format!(
                    "Codec must be four characters, got \"{}\"",
                    self.recording.fourcc
                )));
            }
        }

        // Classifiers are required before the loop can start
        if !self.models.face_cascade.exists() {
            return Err(Error::ConfigError(format!(
                "Face cascade not found: {}",
                self.models.face_cascade.display()
            )));
        }
        if !self.models.eye_cascade.exists() {
            return Err(Error::ConfigError(format!(
                "Eye cascade not found: {}",
                self.models.eye_cascade.display()
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Tracking Mount Configuration

# Haar cascade files
models:
  face_cascade: "./haarcascade_frontalface_default.xml"
  eye_cascade: "./haarcascade_eye.xml"

# Camera streaming
stream:
  camera_index: 0
  video_file: null
  width: 480
  height: 480
  max_read_failures: 50

# Mount driver and travel limits (degrees)
mount:
  driver: simulated   # simulated | device
  device: "/dev/ttyACM0"
  min_x: -80.0
  max_x: 80.0
  min_y: -80.0
  max_y: 80.0
  home_x: 0.0
  home_y: 0.0
  settle_ms: 100

# Proportional feedback
tracking:
  gain: 0.3

# Cascade parameters
detection:
  scale_factor: 1.3
  min_neighbors: 5
  min_face_size: 50
  eye_scale_factor: 1.1
  eye_min_neighbors: 3
  min_eye_size: 25

# Preview window (colors are BGR)
display:
  show: true
  window_title: "Face Tracking Mount"
  face_color: [0, 0, 255]
  target_color: [0, 255, 0]
  thickness: 2
  key_wait_ms: 1
  quit_key: 27

# Output video
recording:
  enabled: true
  output: "./output.avi"
  fourcc: "XVID"
  fps: 10.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn with_models(dir: &Path) -> Config {
        let face = dir.join("face.xml");
        let eye = dir.join("eye.xml");
        std::fs::write(&face, "<opencv_storage/>").unwrap();
        std::fs::write(&eye, "<opencv_storage/>").unwrap();

        let mut config = Config::default();
        config.models.face_cascade = face;
        config.models.eye_cascade = eye;
        config
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.stream.width, 480);
        assert_eq!(config.mount.driver, MountDriver::Simulated);
        assert_eq!(config.tracking.gain, 0.3);
        assert_eq!(config.display.face_color, [0, 0, 255]);
        assert_eq!(config.recording.fourcc, "XVID");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("tracking:\n  gain: 0.5\nmount:\n  driver: device\n").unwrap();
        assert_eq!(config.tracking.gain, 0.5);
        assert_eq!(config.mount.driver, MountDriver::Device);
        assert_eq!(config.mount.max_x, 80.0);
        assert_eq!(config.stream.height, 480);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.mount.min_x = -45.0;
        config.recording.enabled = false;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.mount.min_x, -45.0);
        assert!(!loaded.recording.enabled);
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "stream: [not, a, map").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_accepts_defaults_with_models() {
        let dir = tempfile::tempdir().unwrap();
        assert!(with_models(dir.path()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_models() {
        let mut config = Config::default();
        config.models.face_cascade = PathBuf::from("/nonexistent/face.xml");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let base = with_models(dir.path());

        let mut config = base.clone();
        config.mount.min_x = 90.0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.mount.home_y = -100.0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.tracking.gain = 0.0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.stream.width = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.recording.fourcc = "H264X".to_string();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.detection.scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.stream.max_read_failures = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.tracking.gain = -0.3;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = base.clone();
        config.display.quit_key = 0x171;
        match config.validate() {
            Err(Error::ConfigError(msg)) => assert!(msg.contains("Quit key")),
            other => panic!("Expected ConfigError, got {other:?}"),
        }

        let mut config = base;
        config.display.quit_key = i32::from(b'q');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_settings() {
        let config = Config::default();
        assert_eq!(config.mount_limits(), MountLimits::default());
        assert_eq!(config.home(), MountAngles::home());
        assert_eq!(config.detection_params(), DetectionParams::default());
        assert_eq!(config.annotation_style(), AnnotationStyle::default());
        assert_eq!(config.loop_settings(), LoopSettings::default());
        assert_eq!(config.recording_settings(), RecordingSettings::with_size(480, 480));
    }
}
