//! Face tracking pan/tilt mount controller.

use anyhow::{Context, Result};
use clap::Parser;
use face_tracking_mount::{
    app::FaceTrackingApp,
    config::{Config, MountDriver, EXAMPLE_CONFIG},
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Do not open a preview window
    #[arg(long)]
    no_display: bool,

    /// Do not write an output video
    #[arg(long)]
    no_record: bool,

    /// Output video path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mount driver (simulated, device)
    #[arg(short, long)]
    mount: Option<String>,

    /// Character device for the device mount driver
    #[arg(long)]
    device: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

/// Command line flags override the configuration file
fn apply_overrides(args: &Args, config: &mut Config) -> Result<()> {
    if let Some(cam) = args.cam {
        config.stream.camera_index = cam;
        config.stream.video_file = None;
    }
    if let Some(video) = &args.video {
        config.stream.video_file = Some(video.clone());
    }
    if args.no_display {
        config.display.show = false;
    }
    if args.no_record {
        config.recording.enabled = false;
    }
    if let Some(output) = &args.output {
        config.recording.output = output.clone();
    }
    if let Some(mount) = &args.mount {
        config.mount.driver = match mount.as_str() {
            "simulated" => MountDriver::Simulated,
            "device" => MountDriver::Device,
            other => anyhow::bail!("Unknown mount driver: {other}"),
        };
    }
    if let Some(device) = &args.device {
        config.mount.device = device.clone();
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Tracking Mount");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path).with_context(|| format!("Failed to load {config_path}"))?
    } else {
        Config::default()
    };

    apply_overrides(&args, &mut config)?;

    let app = FaceTrackingApp::new(&config).context("Failed to start face tracking")?;
    app.shutdown_signal().install_interrupt_handler()?;

    let summary = app.run()?;
    info!(
        "Processed {} frames ({} with a target), final mount angles ({:.2}, {:.2})",
        summary.frames_processed, summary.frames_with_target, summary.final_angles.x, summary.final_angles.y
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("face-tracking-mount").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let mut config = Config::default();
        config.stream.video_file = Some("clip.mp4".to_string());
        config.mount.driver = MountDriver::Device;

        apply_overrides(&parse(&[]), &mut config).unwrap();

        assert_eq!(config.stream.video_file.as_deref(), Some("clip.mp4"));
        assert_eq!(config.mount.driver, MountDriver::Device);
        assert!(config.display.show);
        assert!(config.recording.enabled);
    }

    #[test]
    fn test_cam_clears_video_file() {
        let mut config = Config::default();
        config.stream.video_file = Some("clip.mp4".to_string());

        apply_overrides(&parse(&["--cam", "2"]), &mut config).unwrap();

        assert_eq!(config.stream.camera_index, 2);
        assert!(config.stream.video_file.is_none());
    }

    #[test]
    fn test_video_overrides_camera() {
        let mut config = Config::default();
        apply_overrides(&parse(&["-v", "session.mp4"]), &mut config).unwrap();
        assert_eq!(config.stream.video_file.as_deref(), Some("session.mp4"));
    }

    #[test]
    fn test_output_switches() {
        let mut config = Config::default();
        apply_overrides(
            &parse(&["--no-display", "--no-record", "-o", "out/run.avi"]),
            &mut config,
        )
        .unwrap();

        assert!(!config.display.show);
        assert!(!config.recording.enabled);
        assert_eq!(config.recording.output, PathBuf::from("out/run.avi"));
    }

    #[test]
    fn test_mount_driver_and_device() {
        let mut config = Config::default();
        apply_overrides(&parse(&["-m", "device", "--device", "/dev/ttyUSB1"]), &mut config).unwrap();
        assert_eq!(config.mount.driver, MountDriver::Device);
        assert_eq!(config.mount.device, PathBuf::from("/dev/ttyUSB1"));

        apply_overrides(&parse(&["--mount", "simulated"]), &mut config).unwrap();
        assert_eq!(config.mount.driver, MountDriver::Simulated);
    }

    #[test]
    fn test_unknown_mount_driver() {
        let mut config = Config::default();
        let err = apply_overrides(&parse(&["--mount", "gimbal"]), &mut config).unwrap_err();
        assert!(err.to_string().contains("gimbal"));
        assert_eq!(config.mount.driver, MountDriver::Simulated);
    }
}
