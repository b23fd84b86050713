//! Tests for video file input and recording


use face_tracking_mount::{
    camera::{FrameSource, OpenCvCamera, VideoSource},
    frame_loop::{ExitReason, FrameLoop, LoopSettings},
    sinks::{FrameSink, RecordingSettings, VideoRecorder},
    tracking::{MountAngles, MountLimits, TrackingController},
};
use opencv::{core::Rect, prelude::*};
use std::path::Path;
use std::time::Duration;
use test_helpers::{create_test_frame, ScriptedDetector, ScriptedTick, SharedMount};

/// Write a short blank MJPG clip
fn write_test_video(path: &Path, frames: usize, width: i32, height: i32) -> Result<(), String> {
    let settings = RecordingSettings {
        path: path.to_path_buf(),
        fourcc: "MJPG".to_string(),
        fps: 10.0,
        width,
        height,
    };

    let mut recorder = VideoRecorder::create(&settings).map_err(|e| e.to_string())?;
    for _ in 0..frames {
        let frame = create_test_frame(width, height).map_err(|e| e.to_string())?;
        recorder.consume(&frame).map_err(|e| e.to_string())?;
    }
    assert_eq!(recorder.frames_written(), frames as u64);
    recorder.close().map_err(|e| e.to_string())
}

#[test]
fn test_missing_video_file() {
    let mut camera = OpenCvCamera::new(VideoSource::File("/nonexistent/clip.avi".to_string()));
    assert!(camera.start_streaming(480, 480).is_err());
}

#[test]
fn test_frame_before_streaming() {
    let mut camera = OpenCvCamera::new(VideoSource::File("clip.avi".to_string()));
    assert!(camera.frame().is_err());
}

#[test]
#[ignore = "Requires OpenCV built with an MJPG capable video backend"]
fn test_video_file_is_resized_and_ends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.avi");
    if let Err(e) = write_test_video(&path, 5, 320, 240) {
        eprintln!("Skipping test: {}", e);
        return;
    }

    let mut camera = OpenCvCamera::new(VideoSource::File(path.to_string_lossy().into_owned()));
    camera.start_streaming(480, 480).unwrap();

    let mut frames = 0;
    while let Some(frame) = camera.frame().unwrap() {
        assert_eq!(frame.cols(), 480);
        assert_eq!(frame.rows(), 480);
        frames += 1;
    }
    assert_eq!(frames, 5);
}

#[test]
#[ignore = "Requires OpenCV built with an MJPG capable video backend"]
fn test_session_over_video_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.avi");
    if let Err(e) = write_test_video(&path, 3, 480, 480) {
        eprintln!("Skipping test: {}", e);
        return;
    }

    let mount = SharedMount::default();
    let controller = TrackingController::new(mount.clone(), MountLimits::default(), MountAngles::home()).unwrap();
    let detector = ScriptedDetector::new(vec![vec![Rect::new(0, 0, 100, 100)]; 3]);
    let settings = LoopSettings {
        settle_time: Duration::ZERO,
        ..LoopSettings::default()
    };

    let camera = OpenCvCamera::new(VideoSource::File(path.to_string_lossy().into_owned()));
    let summary = FrameLoop::new(camera, detector, controller, ScriptedTick::never(), settings)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(summary.exit_reason, ExitReason::EndOfStream);
    assert_eq!(summary.frames_processed, 3);
    assert_eq!(summary.frames_with_target, 3);
    assert_eq!(mount.log.borrow().releases, 1);
}
