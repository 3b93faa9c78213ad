//! Per-frame intensity pipeline.
//!
//! Owns the active profile, the extractor and the (lazily created) gain
//! controller, so a visualizer holds one value instead of module-level state.

use crate::adaptive::{AdaptiveConfig, AdaptiveGainController, BandInfo};
use crate::error::ConfigError;
use crate::extractor::BandIntensityExtractor;
use crate::profile::BandProfile;

pub struct IntensityEngine {
    profile: BandProfile,
    extractor: BandIntensityExtractor,
    adaptive_config: AdaptiveConfig,
    controller: Option<AdaptiveGainController>,
    adaptive_enabled: bool,
}

impl IntensityEngine {
    /// Engine with adaptive gain off and the visualizer tuning ready for when it is enabled
    pub fn new(profile: BandProfile) -> Self {
        Self {
            profile,
            extractor: BandIntensityExtractor::default(),
            adaptive_config: AdaptiveConfig::visualization(),
            controller: None,
            adaptive_enabled: false,
        }
    }

    pub fn with_adaptive_config(mut self, config: AdaptiveConfig) -> Result<Self, ConfigError> {
        self.set_adaptive_config(config)?;
        Ok(self)
    }

    pub fn with_extractor(mut self, extractor: BandIntensityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn profile(&self) -> &BandProfile {
        &self.profile
    }

    pub fn adaptive_config(&self) -> &AdaptiveConfig {
        &self.adaptive_config
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive_enabled
    }

    pub fn controller(&self) -> Option<&AdaptiveGainController> {
        self.controller.as_ref()
    }

    /// Turn adaptive gain on or off.
    ///
    /// The controller is created on first enable and kept afterwards;
    /// disabling resets it so the next enable starts from unity gain.
    pub fn set_adaptive(&mut self, enabled: bool) {
        if enabled == self.adaptive_enabled {
            return;
        }
        self.adaptive_enabled = enabled;

        if enabled {
            if self.controller.is_none() {
                // adaptive_config was validated when it was set
                self.controller =
                    AdaptiveGainController::for_profile(&self.profile, self.adaptive_config).ok();
            }
            log::info!("Adaptive sensitivity enabled");
        } else {
            if let Some(controller) = self.controller.as_mut() {
                controller.reset();
            }
            log::info!("Adaptive sensitivity disabled");
        }
    }

    /// Replace the gain tuning. Existing controller state is discarded.
    pub fn set_adaptive_config(&mut self, config: AdaptiveConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.adaptive_config = config;

        if self.controller.is_some() {
            self.controller = Some(AdaptiveGainController::for_profile(&self.profile, config)?);
        }
        Ok(())
    }

    /// Switch to another profile and rebind the controller to its band count
    pub fn set_profile(&mut self, profile: BandProfile) {
        log::info!("Switching profile to {} ({} bands)", profile.key, profile.len());
        if let Some(controller) = self.controller.as_mut() {
            controller.rebind(&profile);
        }
        self.profile = profile;
    }

    /// Bounded intensity per band for one spectrum frame
    pub fn process(&mut self, spectrum: &[f32], sample_rate: f32) -> Vec<f32> {
        if self.adaptive_enabled {
            if let Some(controller) = self.controller.as_mut() {
                let adjusted = self.extractor.extract(spectrum, &self.profile, sample_rate);
                return controller.process_frame(&adjusted);
            }
        }

        self.profile
            .bands
            .iter()
            .map(|band| self.extractor.static_intensity(spectrum, band, sample_rate))
            .collect()
    }

    /// Drop all adaptive history (visualizer stopped)
    pub fn reset(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.reset();
        }
    }

    /// Controller diagnostics for a band; `None` before adaptive gain was ever enabled
    pub fn band_info(&self, index: usize) -> Option<BandInfo> {
        self.controller.as_ref()?.band_info(index)
    }
}
