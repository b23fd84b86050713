//! Frame acquisition.

use crate::{
    constants::{CAMERA_RETRY_DELAY_MS, MAX_CAMERA_READ_FAILURES},
    shutdown::ShutdownSignal,
    Error, Result,
};
use log::{info, warn};
use opencv::{
    core::{Mat, Size},
    imgproc::{self, InterpolationFlags},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::time::Duration;

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Camera index
    Camera(i32),
    /// Video file path
    File(String),
}

/// A stream of frames at a fixed resolution
pub trait FrameSource {
    /// Begin continuous capture at the given resolution
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened
    fn start_streaming(&mut self, width: i32, height: i32) -> Result<()>;

    /// Block until the next frame is available.
    ///
    /// Returns `None` once a finite source has no more frames, or when a live
    /// source stops waiting because shutdown was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if capture fails or streaming was never started
    fn frame(&mut self) -> Result<Option<Mat>>;
}

/// Read a frame from a live device, retrying failed reads.
///
/// `read` returns `None` for a failed or empty read. Gives up with
/// `Ok(None)` once `shutdown` is raised, or with an error after
/// `max_failures` consecutive failures.
///
/// # Errors
///
/// Returns an error if `read` fails or the device keeps returning nothing
pub fn read_with_retry<F>(mut read: F, max_failures: u32, shutdown: &ShutdownSignal) -> Result<Option<Mat>>
where
    F: FnMut() -> Result<Option<Mat>>,
{
    let mut failures = 0;
    loop {
        if let Some(frame) = read()? {
            return Ok(Some(frame));
        }
        if shutdown.is_requested() {
            info!("Shutdown requested while waiting for the camera");
            return Ok(None);
        }

        failures += 1;
        if failures >= max_failures {
            return Err(Error::Camera(format!(
                "No frame received after {failures} consecutive reads"
            )));
        }
        warn!("Failed to read frame, retrying ({}/{})", failures, max_failures);
        std::thread::sleep(Duration::from_millis(CAMERA_RETRY_DELAY_MS));
    }
}

/// Frame source backed by `OpenCV` video capture
pub struct OpenCvCamera {
    source: VideoSource,
    capture: Option<VideoCapture>,
    size: Size,
    max_read_failures: u32,
    shutdown: ShutdownSignal,
}

impl OpenCvCamera {
    /// Create a camera for the given source. Nothing is opened until streaming starts.
    #[must_use]
    pub const fn new(source: VideoSource) -> Self {
        Self {
            source,
            capture: None,
            size: Size { width: 0, height: 0 },
            max_read_failures: MAX_CAMERA_READ_FAILURES,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Number of consecutive failed reads tolerated on a live camera
    #[must_use]
    pub fn with_max_read_failures(mut self, max_read_failures: u32) -> Self {
        self.max_read_failures = max_read_failures.max(1);
        self
    }

    /// Stop retrying failed reads once this flag is raised
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    fn open(&self, width: i32, height: i32) -> Result<VideoCapture> {
        let capture = match &self.source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;

                // Keep only the latest frame to reduce latency
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap.set(CAP_PROP_FRAME_WIDTH, f64::from(width))?;
                cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !capture.is_opened()? {
            return Err(Error::Camera(format!("Failed to open {:?}", self.source)));
        }

        Ok(capture)
    }
}

impl FrameSource for OpenCvCamera {
    fn start_streaming(&mut self, width: i32, height: i32) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidInput(format!(
                "Streaming resolution must be positive, got {width}x{height}"
            )));
        }

        self.capture = Some(self.open(width, height)?);
        self.size = Size::new(width, height);
        info!("Streaming at {}x{}", width, height);
        Ok(())
    }

    fn frame(&mut self) -> Result<Option<Mat>> {
        let capture = self
            .capture
            .as_mut()
            .ok_or_else(|| Error::Camera("Streaming has not been started".to_string()))?;

        let mut read_once = || -> Result<Option<Mat>> {
            let mut frame = Mat::default();
            let ok = capture.read(&mut frame)?;
            Ok((ok && !frame.empty()).then_some(frame))
        };

        let frame = match self.source {
            VideoSource::File(_) => read_once()?,
            VideoSource::Camera(_) => read_with_retry(read_once, self.max_read_failures, &self.shutdown)?,
        };
        let Some(frame) = frame else {
            if matches!(self.source, VideoSource::File(_)) {
                info!("End of video file reached");
            }
            return Ok(None);
        };

        if frame.size()? == self.size {
            return Ok(Some(frame));
        }

        let mut resized = Mat::default();
        imgproc::resize(
            &frame,
            &mut resized,
            self.size,
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;
        Ok(Some(resized))
    }
}
