//! Error types for engine configuration

use thiserror::Error;

/// Rejected adaptive gain settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The sensitivity floor must stay above zero or the gain math divides by zero
    #[error("min_sensitivity must be greater than 0 (got {0})")]
    NonPositiveMinSensitivity(f32),

    #[error("min_sensitivity ({min}) exceeds max_sensitivity ({max})")]
    InvertedSensitivityRange { min: f32, max: f32 },

    #[error("target_peak must be in (0, 1] (got {0})")]
    TargetPeakOutOfRange(f32),

    #[error("adaptation_speed must be in (0, 1] (got {0})")]
    AdaptationSpeedOutOfRange(f32),

    #[error("noise_floor must be non-negative (got {0})")]
    NegativeNoiseFloor(f32),

    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },
}

/// Rejected band profile definitions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("profile '{0}' has no bands")]
    Empty(String),

    #[error("band {index} ('{name}'): low_hz {low_hz} must be below high_hz {high_hz}")]
    InvertedRange {
        index: usize,
        name: String,
        low_hz: f32,
        high_hz: f32,
    },

    #[error("band {index} ('{name}'): sensitivity {sensitivity} must be a non-negative number")]
    InvalidSensitivity {
        index: usize,
        name: String,
        sensitivity: f32,
    },

    #[error("unknown profile '{0}'")]
    Unknown(String),
}
