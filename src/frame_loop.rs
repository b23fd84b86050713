//! The per-frame tracking cycle and its lifecycle.
//!
//! A session homes the mount, waits for it to settle, starts streaming and then
//! repeats: acquire → detect → select → correct → annotate → output → tick.
//! Whatever ends the loop (quit key, interrupt, end of stream or an error),
//! every sink is closed and the mount is released before `run` returns.

use crate::{
    angle_mapping::AngleMapper,
    annotation::{annotate_frame, AnnotationStyle},
    camera::FrameSource,
    constants::{MOUNT_SETTLE_MS, STREAMING_HEIGHT, STREAMING_WIDTH},
    face_detection::CandidateDetector,
    mount::PanTiltMount,
    shutdown::ShutdownSignal,
    sinks::FrameSink,
    target_selection::{select_target, target_center},
    tick::{default_timeout, Tick, TickOutcome},
    tracking::{MountAngles, TrackingController},
    Result,
};
use log::{info, warn};
use std::time::Duration;

/// Timing and geometry of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Streaming width in pixels
    pub width: i32,
    /// Streaming height in pixels
    pub height: i32,
    /// Wait after homing the mount, before streaming starts
    pub settle_time: Duration,
    /// Bounded wait of each tick
    pub tick_timeout: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            width: STREAMING_WIDTH,
            height: STREAMING_HEIGHT,
            settle_time: Duration::from_millis(MOUNT_SETTLE_MS),
            tick_timeout: default_timeout(),
        }
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Quit key pressed
    QuitKey,
    /// Interrupt signal observed
    Interrupted,
    /// Finite source ran out of frames
    EndOfStream,
}

/// What happened during a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    /// Frames that went through detection
    pub frames_processed: u64,
    /// Frames in which a target was selected and the mount corrected
    pub frames_with_target: u64,
    /// Why the loop stopped
    pub exit_reason: ExitReason,
    /// Last commanded mount angles
    pub final_angles: MountAngles,
}

/// Everything a tracking session needs, wired together
pub struct FrameLoop<S, D, M, T>
where
    S: FrameSource,
    D: CandidateDetector,
    M: PanTiltMount,
    T: Tick,
{
    source: S,
    detector: D,
    controller: TrackingController<M>,
    mapper: AngleMapper,
    tick: T,
    sinks: Vec<Box<dyn FrameSink>>,
    style: AnnotationStyle,
    shutdown: ShutdownSignal,
    settings: LoopSettings,
    frames_processed: u64,
    frames_with_target: u64,
}

impl<S, D, M, T> FrameLoop<S, D, M, T>
where
    S: FrameSource,
    D: CandidateDetector,
    M: PanTiltMount,
    T: Tick,
{
    /// Wire a session together
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution and mount limits cannot form an angle mapping
    pub fn new(
        source: S,
        detector: D,
        controller: TrackingController<M>,
        tick: T,
        settings: LoopSettings,
    ) -> Result<Self> {
        let mapper = AngleMapper::new(settings.width, settings.height, controller.limits())?;

        Ok(Self {
            source,
            detector,
            controller,
            mapper,
            tick,
            sinks: Vec::new(),
            style: AnnotationStyle::default(),
            shutdown: ShutdownSignal::new(),
            settings,
            frames_processed: 0,
            frames_with_target: 0,
        })
    }

    /// Add a destination for annotated frames
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Use a custom annotation style
    #[must_use]
    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    /// Observe an externally owned cancellation flag
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Cancellation flag observed by this loop
    #[must_use]
    pub const fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Run the session to completion and tear everything down.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while starting or looping; teardown has
    /// already run by then. A teardown failure is returned if the loop itself
    /// succeeded.
    pub fn run(mut self) -> Result<SessionSummary> {
        let outcome = self.start().and_then(|()| self.run_loop());
        let teardown = self.teardown();

        let exit_reason = outcome?;
        teardown?;

        let summary = SessionSummary {
            frames_processed: self.frames_processed,
            frames_with_target: self.frames_with_target,
            exit_reason,
            final_angles: self.controller.angles(),
        };
        info!(
            "Session ended ({:?}): {} frames, {} with a target",
            summary.exit_reason, summary.frames_processed, summary.frames_with_target
        );
        Ok(summary)
    }

    fn start(&mut self) -> Result<()> {
        self.controller.home()?;
        std::thread::sleep(self.settings.settle_time);
        self.source.start_streaming(self.settings.width, self.settings.height)
    }

    fn run_loop(&mut self) -> Result<ExitReason> {
        info!("Entering tracking loop");
        loop {
            if self.shutdown.is_requested() {
                info!("Quit face tracking");
                return Ok(ExitReason::Interrupted);
            }

            let Some(mut frame) = self.source.frame()? else {
                // A live source gives up early when shutdown is requested
                if self.shutdown.is_requested() {
                    info!("Quit face tracking");
                    return Ok(ExitReason::Interrupted);
                }
                return Ok(ExitReason::EndOfStream);
            };

            let candidates = self.detector.detect(&frame)?;
            self.frames_processed += 1;

            let target = select_target(&candidates);
            if let Some(region) = target {
                let (cx, cy) = target_center(&region);
                let delta = self.mapper.pixels_to_angle(cx, cy);
                self.controller.update(delta)?;
                self.frames_with_target += 1;
            }

            if !self.sinks.is_empty() {
                annotate_frame(&mut frame, &candidates, target, &self.style)?;
                for sink in &mut self.sinks {
                    sink.consume(&frame)?;
                }
            }

            if self.tick.tick(self.settings.tick_timeout)? == TickOutcome::Quit {
                return Ok(ExitReason::QuitKey);
            }
        }
    }

    fn teardown(&mut self) -> Result<()> {
        let mut first_error = None;

        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                warn!("Failed to close {}: {}", sink.name(), e);
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.controller.release() {
            warn!("Failed to release mount: {}", e);
            first_error.get_or_insert(e);
        }

        first_error.map_or(Ok(()), Err)
    }
}
