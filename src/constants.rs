//! Constants used throughout the application

/// Default streaming resolution (pixels)
pub const STREAMING_WIDTH: i32 = 480;
pub const STREAMING_HEIGHT: i32 = 480;

/// Consecutive failed camera reads before the camera is considered lost
pub const MAX_CAMERA_READ_FAILURES: u32 = 50;

/// Pause between camera read retries (milliseconds)
pub const CAMERA_RETRY_DELAY_MS: u64 = 20;

/// Mechanical limits of the pan axis (degrees)
pub const MIN_X_CAMERA_ANGLE: f64 = -80.0;
pub const MAX_X_CAMERA_ANGLE: f64 = 80.0;

/// Mechanical limits of the tilt axis (degrees)
pub const MIN_Y_CAMERA_ANGLE: f64 = -80.0;
pub const MAX_Y_CAMERA_ANGLE: f64 = 80.0;

/// Home position commanded before streaming starts (degrees)
pub const HOME_X_ANGLE: f64 = 0.0;
pub const HOME_Y_ANGLE: f64 = 0.0;

/// Fraction of each correction applied per frame
pub const DAMPING_GAIN: f64 = 0.3;

/// Time allowed for the mount to reach home before streaming (ms)
pub const MOUNT_SETTLE_MS: u64 = 100;

/// Haar cascade locations
pub const FACE_CASCADE_FILE: &str = "./haarcascade_frontalface_default.xml";
pub const EYE_CASCADE_FILE: &str = "./haarcascade_eye.xml";

/// Face detector parameters
pub const FACE_SCALE_FACTOR: f64 = 1.3;
pub const FACE_MIN_NEIGHBORS: i32 = 5;
pub const FACE_MIN_SIZE: i32 = 50;

/// Eye detector parameters (`OpenCV` defaults apart from the minimum size)
pub const EYE_SCALE_FACTOR: f64 = 1.1;
pub const EYE_MIN_NEIGHBORS: i32 = 3;
pub const EYE_MIN_SIZE: i32 = 25;

/// Window title for the annotated stream
pub const WINDOW_TITLE: &str = "Face Tracking Mount";

/// Key poll timeout per iteration (ms)
pub const KEY_WAIT_TIME_MS: u64 = 1;

/// ESC key code used to quit
pub const ESC_KEY_NUM: i32 = 27;

/// Rectangle colors in BGR order
pub const FACE_RECT_COLOR: [u8; 3] = [0, 0, 255];
pub const TARGET_RECT_COLOR: [u8; 3] = [0, 255, 0];

/// Rectangle line thickness (pixels)
pub const RECT_THICKNESS: i32 = 2;

/// Output video defaults
pub const OUTPUT_VIDEO_FILE: &str = "./output.avi";
pub const VIDEO_FRAMERATE: f64 = 10.0;
pub const VIDEO_FOURCC: &str = "XVID";
