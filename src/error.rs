//! Error types for the face tracking mount library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Haar cascade could not be loaded or is empty
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Camera could not be opened or configured
    #[error("Camera error: {0}")]
    Camera(String),

    /// Mount connection or command failed
    #[error("Mount error: {0}")]
    Mount(String),

    /// Output video could not be opened or written
    #[error("Recording error: {0}")]
    Recording(String),

    /// Interrupt handler installation failed
    #[error("Signal error: {0}")]
    Signal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
