//! Consumers of annotated frames: the preview window and the output video.
//!
//! Both hold a resource that must be released when the session ends. They are
//! closed explicitly during teardown and again on `Drop` if teardown never ran.

use crate::{
    constants::{OUTPUT_VIDEO_FILE, VIDEO_FOURCC, VIDEO_FRAMERATE},
    Error, Result,
};
use log::{info, warn};
use opencv::{
    core::{Mat, Size},
    highgui::{self, WINDOW_NORMAL},
    prelude::*,
    videoio::VideoWriter,
};
use std::path::PathBuf;

/// Destination for annotated frames
pub trait FrameSink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Hand one frame to the sink
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be shown or written
    fn consume(&mut self, frame: &Mat) -> Result<()>;

    /// Release the underlying resource. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource fails to close
    fn close(&mut self) -> Result<()>;
}

/// Preview window for the annotated stream
pub struct DisplayWindow {
    title: String,
    open: bool,
}

impl DisplayWindow {
    /// Create the window
    ///
    /// # Errors
    ///
    /// Returns an error if no display is available
    pub fn open(title: &str) -> Result<Self> {
        highgui::named_window(title, WINDOW_NORMAL)?;
        info!("Opened window \"{}\"", title);
        Ok(Self {
            title: title.to_string(),
            open: true,
        })
    }
}

impl FrameSink for DisplayWindow {
    fn name(&self) -> &str {
        "display"
    }

    fn consume(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.title, frame)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        highgui::destroy_window(&self.title)?;
        info!("Closed window \"{}\"", self.title);
        Ok(())
    }
}

impl Drop for DisplayWindow {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close window: {}", e);
        }
    }
}

/// Output video settings
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSettings {
    /// Output file path
    pub path: PathBuf,
    /// Four character codec code
    pub fourcc: String,
    /// Nominal frame rate written to the container
    pub fps: f64,
    /// Frame size (must match the streaming resolution)
    pub width: i32,
    /// Frame size (must match the streaming resolution)
    pub height: i32,
}

impl RecordingSettings {
    /// Default settings for the given frame size
    #[must_use]
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            path: PathBuf::from(OUTPUT_VIDEO_FILE),
            fourcc: VIDEO_FOURCC.to_string(),
            fps: VIDEO_FRAMERATE,
            width,
            height,
        }
    }

    /// Split the codec string into the four characters `OpenCV` expects
    ///
    /// # Errors
    ///
    /// Returns an error unless the code is exactly four characters
    pub fn fourcc_chars(&self) -> Result<[char; 4]> {
        let chars: Vec<char> = self.fourcc.chars().collect();
        match chars.as_slice() {
            [a, b, c, d] => Ok([*a, *b, *c, *d]),
            _ => Err(Error::Recording(format!(
                "Codec must be four characters, got \"{}\"",
                self.fourcc
            ))),
        }
    }
}

/// Appends every frame it receives to a video file
pub struct VideoRecorder {
    writer: VideoWriter,
    path: PathBuf,
    frames_written: u64,
    open: bool,
}

impl VideoRecorder {
    /// Open the output file
    ///
    /// # Errors
    ///
    /// Returns an error if the codec is invalid or the file cannot be created
    pub fn create(settings: &RecordingSettings) -> Result<Self> {
        let [a, b, c, d] = settings.fourcc_chars()?;
        let fourcc = VideoWriter::fourcc(a, b, c, d)?;

        let path_str = settings
            .path
            .to_str()
            .ok_or_else(|| Error::Recording(format!("Output path is not valid UTF-8: {}", settings.path.display())))?;

        let writer = VideoWriter::new(
            path_str,
            fourcc,
            settings.fps,
            Size::new(settings.width, settings.height),
            true,
        )?;

        if !writer.is_opened()? {
            return Err(Error::Recording(format!(
                "Failed to open video writer for {}",
                settings.path.display()
            )));
        }

        info!(
            "Recording to {} ({}x{} @ {} fps, {})",
            settings.path.display(),
            settings.width,
            settings.height,
            settings.fps,
            settings.fourcc
        );

        Ok(Self {
            writer,
            path: settings.path.clone(),
            frames_written: 0,
            open: true,
        })
    }

    /// Number of frames appended so far
    #[must_use]
    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for VideoRecorder {
    fn name(&self) -> &str {
        "recording"
    }

    fn consume(&mut self, frame: &Mat) -> Result<()> {
        if !self.open {
            return Err(Error::Recording("Frame written after the video was finalized".to_string()));
        }
        self.writer.write(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.writer.release()?;
        info!("Finalized {} ({} frames)", self.path.display(), self.frames_written);
        Ok(())
    }
}

impl Drop for VideoRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to finalize video: {}", e);
        }
    }
}
