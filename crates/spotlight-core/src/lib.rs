//! Band intensity engine for spectrum-driven visualizers
//!
//! Turns a magnitude spectrum into one bounded intensity per frequency band.
//! Raw band energy is scaled by a static per-band sensitivity and, optionally,
//! by an automatic gain controller that keeps each band's recent peak near a
//! target level.

pub mod adaptive;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod profile;

pub use adaptive::{soft_clip, AdaptiveConfig, AdaptiveGainController, BandInfo};
pub use engine::IntensityEngine;
pub use error::{ConfigError, ProfileError};
pub use extractor::{BandIntensityExtractor, BYTE_FULL_SCALE};
pub use profile::{BandProfile, FrequencyBand, BUILTIN_PROFILE_KEYS};
