//! Automatic gain control for band intensities.
//!
//! Each band keeps a smoothed level and a short peak window. Every
//! [`ADAPTATION_INTERVAL`] frames the controller nudges each band's
//! sensitivity so that its recent peak approaches the target level:
//!
//! ```text
//! ratio = target_peak / (recent_peak * sensitivity)
//! sensitivity *= 1 + adaptation_speed * (ratio - 1)
//! ```
//!
//! The adjusted value is then passed through a soft knee at 0.9.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profile::BandProfile;

/// Frames kept in each band's peak window (~0.5s at 60fps)
pub const PEAK_HISTORY_LEN: usize = 30;

/// Sensitivity is recomputed once every this many frames, for all bands at once
pub const ADAPTATION_INTERVAL: u64 = 10;

/// Smoothing factor for the per-band average level
const AVERAGE_ALPHA: f32 = 0.1;

const SOFT_CLIP_KNEE: f32 = 0.9;
const SOFT_CLIP_SLOPE: f32 = 0.3;

/// Tuning for the gain controller
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AdaptiveConfig {
    /// Level each band's recent peak is steered toward
    pub target_peak: f32,
    /// Fraction of the remaining correction applied per adaptation step
    pub adaptation_speed: f32,
    /// Peaks at or below this level leave sensitivity untouched
    pub noise_floor: f32,
    pub max_sensitivity: f32,
    pub min_sensitivity: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            target_peak: 0.85,
            adaptation_speed: 0.05,
            noise_floor: 0.05,
            max_sensitivity: 2.0,
            min_sensitivity: 0.1,
        }
    }
}

impl AdaptiveConfig {
    /// Slower, wider-range tuning used by the spotlight visualizer
    pub fn visualization() -> Self {
        Self {
            target_peak: 0.8,
            adaptation_speed: 0.03,
            noise_floor: 0.02,
            max_sensitivity: 3.0,
            min_sensitivity: 0.2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("target_peak", self.target_peak),
            ("adaptation_speed", self.adaptation_speed),
            ("noise_floor", self.noise_floor),
            ("max_sensitivity", self.max_sensitivity),
            ("min_sensitivity", self.min_sensitivity),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite { field });
        }

        if self.min_sensitivity <= 0.0 {
            return Err(ConfigError::NonPositiveMinSensitivity(self.min_sensitivity));
        }
        if self.min_sensitivity > self.max_sensitivity {
            return Err(ConfigError::InvertedSensitivityRange {
                min: self.min_sensitivity,
                max: self.max_sensitivity,
            });
        }
        if self.target_peak <= 0.0 || self.target_peak > 1.0 {
            return Err(ConfigError::TargetPeakOutOfRange(self.target_peak));
        }
        if self.adaptation_speed <= 0.0 || self.adaptation_speed > 1.0 {
            return Err(ConfigError::AdaptationSpeedOutOfRange(self.adaptation_speed));
        }
        if self.noise_floor < 0.0 {
            return Err(ConfigError::NegativeNoiseFloor(self.noise_floor));
        }

        Ok(())
    }
}

/// Soft knee: identity up to 0.9, then a 0.3 slope above it.
///
/// Values at or below the knee are capped at 1.0. The curve itself keeps
/// rising past 1.0 for inputs above ~1.233; callers clamp the final output.
pub fn soft_clip(value: f32) -> f32 {
    if value > SOFT_CLIP_KNEE {
        SOFT_CLIP_KNEE + (value - SOFT_CLIP_KNEE) * SOFT_CLIP_SLOPE
    } else {
        value.min(1.0)
    }
}

/// Read-only snapshot of one band's controller state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandInfo {
    pub sensitivity: f32,
    pub average_level: f32,
    /// Max of the peak window, 0 when the window is empty
    pub recent_peak: f32,
}

#[derive(Clone, Debug)]
struct BandState {
    sensitivity: f32,
    average_level: f32,
    peak_history: VecDeque<f32>,
}

impl Default for BandState {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            average_level: 0.0,
            peak_history: VecDeque::with_capacity(PEAK_HISTORY_LEN + 1),
        }
    }
}

impl BandState {
    fn recent_peak(&self) -> Option<f32> {
        self.peak_history.iter().copied().reduce(f32::max)
    }

    fn observe(&mut self, intensity: f32) {
        self.average_level =
            AVERAGE_ALPHA * intensity + (1.0 - AVERAGE_ALPHA) * self.average_level;

        self.peak_history.push_back(intensity);
        if self.peak_history.len() > PEAK_HISTORY_LEN {
            self.peak_history.pop_front();
        }
    }

    fn adapt(&mut self, config: &AdaptiveConfig) {
        let Some(recent_peak) = self.recent_peak() else {
            return;
        };
        if recent_peak <= config.noise_floor {
            return;
        }

        let current_peak = recent_peak * self.sensitivity;
        let ratio = config.target_peak / current_peak;
        let next = self.sensitivity * (1.0 + config.adaptation_speed * (ratio - 1.0));

        self.sensitivity = next.clamp(config.min_sensitivity, config.max_sensitivity);
    }
}

/// Per-band automatic gain controller.
///
/// Owns one state slot per band index. Callers must [`rebind`] (or
/// [`resize`]) whenever the active profile changes.
///
/// [`rebind`]: AdaptiveGainController::rebind
/// [`resize`]: AdaptiveGainController::resize
#[derive(Clone, Debug)]
pub struct AdaptiveGainController {
    config: AdaptiveConfig,
    bands: Vec<BandState>,
    frame_count: u64,
}

impl AdaptiveGainController {
    pub fn new(num_bands: usize, config: AdaptiveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            bands: vec![BandState::default(); num_bands],
            frame_count: 0,
        })
    }

    /// Controller sized for `profile`
    pub fn for_profile(profile: &BandProfile, config: AdaptiveConfig) -> Result<Self, ConfigError> {
        Self::new(profile.len(), config)
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    /// Frames processed since construction or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run one frame of profile-adjusted intensities through the controller.
    ///
    /// Returns one value in [0, 1] per band. Inputs beyond the configured band
    /// count are ignored; non-finite inputs are treated as silence.
    pub fn process_frame(&mut self, intensities: &[f32]) -> Vec<f32> {
        self.frame_count += 1;
        let adapt_now = self.frame_count % ADAPTATION_INTERVAL == 0;

        if intensities.len() != self.bands.len() {
            log::debug!(
                "process_frame got {} intensities for {} bands",
                intensities.len(),
                self.bands.len()
            );
        }

        let config = self.config;
        intensities
            .iter()
            .zip(self.bands.iter_mut())
            .enumerate()
            .map(|(index, (&raw, band))| {
                let intensity = if raw.is_finite() { raw.max(0.0) } else { 0.0 };

                band.observe(intensity);

                if adapt_now {
                    let before = band.sensitivity;
                    band.adapt(&config);
                    log::trace!(
                        "band {}: sensitivity {:.3} -> {:.3}",
                        index,
                        before,
                        band.sensitivity
                    );
                }

                soft_clip(intensity * band.sensitivity).clamp(0.0, 1.0)
            })
            .collect()
    }

    /// Return every band to unity sensitivity with empty history
    pub fn reset(&mut self) {
        self.bands.iter_mut().for_each(|band| *band = BandState::default());
        self.frame_count = 0;
    }

    /// Resize to `num_bands` and reset all state
    pub fn resize(&mut self, num_bands: usize) {
        self.bands = vec![BandState::default(); num_bands];
        self.frame_count = 0;
    }

    /// Resize to the band count of `profile` and reset all state
    pub fn rebind(&mut self, profile: &BandProfile) {
        self.resize(profile.len());
    }

    /// Diagnostic snapshot for a band, `None` if the index is out of range
    pub fn band_info(&self, index: usize) -> Option<BandInfo> {
        self.bands.get(index).map(|band| BandInfo {
            sensitivity: band.sensitivity,
            average_level: band.average_level,
            recent_peak: band.recent_peak().unwrap_or(0.0),
        })
    }

    pub fn peak_history_len(&self, index: usize) -> Option<usize> {
        self.bands.get(index).map(|band| band.peak_history.len())
    }
}
