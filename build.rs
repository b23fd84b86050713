//! Build script for detecting system dependencies and providing installation guidance.
//!
//! This script checks for the `OpenCV` libraries, the Haar cascade data shipped with
//! them and pkg-config, and prints hints if something is missing.

use std::path::Path;
use std::process::Command;

/// Common install locations of the `OpenCV` Haar cascades
const CASCADE_DIRS: [&str; 3] = [
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/opt/homebrew/share/opencv4/haarcascades",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check for OpenCV
    check_opencv();

    // Check for the cascade files used by the face detector
    check_cascades();

    // Check for pkg-config
    check_pkg_config();
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    for package in ["opencv4", "opencv"] {
        let output = Command::new("pkg-config").args(["--modversion", package]).output();
        if let Ok(output) = output {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout);
                println!("cargo:warning=Found OpenCV version: {}", version.trim());
                return;
            }
        }
    }

    println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
    println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
    println!("cargo:warning=On macOS: brew install opencv");
    println!("cargo:warning=On Raspberry Pi OS: sudo apt-get install libopencv-dev clang libclang-dev");
}

fn check_cascades() {
    let found = CASCADE_DIRS
        .iter()
        .map(Path::new)
        .find(|dir| dir.join("haarcascade_frontalface_default.xml").exists());

    match found {
        Some(dir) => println!("cargo:warning=Found Haar cascades in {}", dir.display()),
        None => {
            println!("cargo:warning=Haar cascades not found in the usual locations.");
            println!("cargo:warning=Copy haarcascade_frontalface_default.xml and haarcascade_eye.xml next to the binary");
            println!("cargo:warning=or point models.face_cascade / models.eye_cascade at them in the config file.");
        }
    }
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Found pkg-config version: {}", version.trim());
        }
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}
