//! Error types for meter startup

use std::io;
use thiserror::Error;

/// Result type for meter operations
pub type Result<T> = std::result::Result<T, MeterError>;

/// Errors that stop the meter before its main loop runs.
///
/// None of these are retried: each one means the environment is unusable.
#[derive(Error, Debug)]
pub enum MeterError {
    /// Sample rate reported by the device is unusable
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Refresh rate must be a positive, finite number of frames per second
    #[error("invalid refresh rate: {0} (must be greater than 0)")]
    InvalidRefreshRate(f32),

    /// Host has no default input device
    #[error("no audio input device found")]
    NoInputDevice,

    /// Device reported zero channels
    #[error("audio device {0} reported 0 channels")]
    NoChannels(String),

    /// A requested source did not match any input device
    #[error("couldn't connect to source {0}")]
    SourceNotFound(String),

    /// A meter owns a single input stream, so it cannot follow two devices
    #[error(
        "couldn't connect to source {second}: already metering {first} (one input device per meter)"
    )]
    MultipleSources { first: String, second: String },

    /// Device enumeration failed
    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    /// Device has no usable input configuration
    #[error("failed to query input configuration: {0}")]
    InputConfig(#[from] cpal::DefaultStreamConfigError),

    /// Stream (and its callback) could not be registered
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Stream could not be started
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Terminal or stdout failure
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
