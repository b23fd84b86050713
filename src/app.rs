//! Main application module: builds a tracking session from configuration.

use crate::{
    camera::{OpenCvCamera, VideoSource},
    config::{Config, MountDriver},
    face_detection::{CascadeFaceDetector, CascadeModels},
    frame_loop::{FrameLoop, SessionSummary},
    mount::{LineProtocolMount, PanTiltMount, SimulatedMount},
    shutdown::ShutdownSignal,
    sinks::{DisplayWindow, FrameSink, VideoRecorder},
    tick::{HighGuiTick, SleepTick, Tick},
    tracking::TrackingController,
    Result,
};
use log::info;

type AppLoop = FrameLoop<OpenCvCamera, CascadeFaceDetector, Box<dyn PanTiltMount>, Box<dyn Tick>>;

/// Face tracking application wired from a [`Config`]
pub struct FaceTrackingApp {
    frame_loop: AppLoop,
}

impl FaceTrackingApp {
    /// Load models, connect the mount and open outputs.
    ///
    /// Any failure here is fatal: the loop is never entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a classifier fails to
    /// load, the mount cannot be opened or an output cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing face tracking");
        config.validate()?;

        let models = CascadeModels::load(&config.models.face_cascade, &config.models.eye_cascade)?;
        let detector = CascadeFaceDetector::new(models, config.detection_params());

        let mount: Box<dyn PanTiltMount> = match config.mount.driver {
            MountDriver::Simulated => Box::new(SimulatedMount::new()),
            MountDriver::Device => Box::new(LineProtocolMount::open_device(&config.mount.device)?),
        };
        let controller =
            TrackingController::with_gain(mount, config.mount_limits(), config.home(), config.tracking.gain)?;

        let source = match &config.stream.video_file {
            Some(path) => VideoSource::File(path.clone()),
            None => VideoSource::Camera(config.stream.camera_index),
        };
        let shutdown = ShutdownSignal::new();
        let camera = OpenCvCamera::new(source)
            .with_max_read_failures(config.stream.max_read_failures)
            .with_shutdown(shutdown.clone());

        let tick: Box<dyn Tick> = if config.display.show {
            Box::new(HighGuiTick::new(config.display.quit_key)?)
        } else {
            Box::new(SleepTick)
        };

        let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
        if config.display.show {
            sinks.push(Box::new(DisplayWindow::open(&config.display.window_title)?));
        }
        if config.recording.enabled {
            sinks.push(Box::new(VideoRecorder::create(&config.recording_settings())?));
        }

        let mut frame_loop = FrameLoop::new(camera, detector, controller, tick, config.loop_settings())?
            .with_style(config.annotation_style())
            .with_shutdown(shutdown);
        for sink in sinks {
            frame_loop = frame_loop.with_sink(sink);
        }

        Ok(Self { frame_loop })
    }

    /// Cancellation flag of the session, for wiring an interrupt handler
    #[must_use]
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        self.frame_loop.shutdown_signal()
    }

    /// Run until quit, interrupt or end of stream
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the loop, after teardown
    pub fn run(self) -> Result<SessionSummary> {
        self.frame_loop.run()
    }
}
