//! Audio capture and analysis errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio devices found")]
    NoDevices,

    #[error("Audio device index {index} out of range ({count} devices)")]
    DeviceIndexOutOfRange { index: usize, count: usize },

    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    #[error("Device config timed out after {0:?}")]
    ConfigTimeout(std::time::Duration),

    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),

    #[error("FFT size must be a power of two in 32..=32768 (got {0})")]
    InvalidFftSize(usize),
}
