//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.spotlight.toml`.

use serde::{Deserialize, Serialize};
use spotlight_core::{AdaptiveConfig, BandProfile};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::DEFAULT_FFT_SIZE;

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_FPS: u32 = 60;

const CONFIG_TEMPLATE: &str = r##"# spotlight configuration file
# Changes are picked up while running (checked about twice a second).

# Timeout in seconds when opening audio devices (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = true

# Analyser FFT size, power of two between 32 and 32768 (default: 128 -> 64 bins)
# fft_size = 128

# Frames per second of the meter (default: 60)
# fps = 60

# =============================================================================
# Bands
# =============================================================================

# Active profile: DEFAULT, ROCK, ELECTRONIC, CLASSICAL, MORRICONE or a custom key
# profile = "DEFAULT"

# Custom profiles (selected by key, checked before the built-in ones)
# [[custom_profiles]]
# key = "PODCAST"
# label = "Podcast"
# bands = [
#   { low_hz = 0, high_hz = 300, sensitivity = 0.8, name = "Body", color = "#FF7043" },
#   { low_hz = 300, high_hz = 3400, sensitivity = 1.0, name = "Voice", color = "#66BB6A" },
#   { low_hz = 3400, high_hz = 22050, sensitivity = 1.4, name = "Air", color = "#42A5F5" },
# ]

# =============================================================================
# Adaptive sensitivity
# =============================================================================

# Enable automatic per-band gain (default: false)
# adaptive = false

# target_peak = 0.8         # Level each band's recent peak is steered toward
# adaptation_speed = 0.03   # Fraction of the correction applied every 10 frames
# noise_floor = 0.02        # Peaks at or below this leave the gain alone
# max_sensitivity = 3.0
# min_sensitivity = 0.2     # Must be above 0
"##;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,
    pub fft_size: Option<usize>,
    pub fps: Option<u32>,

    pub profile: Option<String>,
    pub custom_profiles: Option<Vec<BandProfile>>,

    // Adaptive sensitivity (flattened for simpler TOML)
    pub adaptive: Option<bool>,
    pub target_peak: Option<f32>,
    pub adaptation_speed: Option<f32>,
    pub noise_floor: Option<f32>,
    pub max_sensitivity: Option<f32>,
    pub min_sensitivity: Option<f32>,
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".spotlight.toml"))
    }

    /// Load from the home directory, writing the template on first run.
    /// Unreadable or invalid files yield the defaults.
    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => log::info!("Created config template at {:?}", path),
                Err(e) => log::warn!("Could not create config template at {:?}: {}", path, e),
            }
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{}; using defaults", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        match toml::to_string(self) {
            Ok(content) => match fs::write(&path, content) {
                Ok(()) => log::info!("Config saved to {:?}", path),
                Err(e) => log::warn!("Failed to save config to {:?}: {}", path, e),
            },
            Err(e) => log::warn!("Failed to serialize config: {}", e),
        }
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
        self.save();
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs
            .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size.unwrap_or(DEFAULT_FFT_SIZE)
    }

    pub fn fps(&self) -> u32 {
        self.fps.unwrap_or(DEFAULT_FPS).clamp(1, 240)
    }

    pub fn adaptive(&self) -> bool {
        self.adaptive.unwrap_or(false)
    }

    pub fn profile_key(&self) -> &str {
        self.profile.as_deref().unwrap_or("DEFAULT")
    }

    /// Adaptive tuning: visualizer preset with any configured overrides applied
    pub fn adaptive_config(&self) -> AdaptiveConfig {
        let preset = AdaptiveConfig::visualization();
        AdaptiveConfig {
            target_peak: self.target_peak.unwrap_or(preset.target_peak),
            adaptation_speed: self.adaptation_speed.unwrap_or(preset.adaptation_speed),
            noise_floor: self.noise_floor.unwrap_or(preset.noise_floor),
            max_sensitivity: self.max_sensitivity.unwrap_or(preset.max_sensitivity),
            min_sensitivity: self.min_sensitivity.unwrap_or(preset.min_sensitivity),
        }
    }

    /// Custom profile with this key, else the built-in one
    pub fn find_profile(&self, key: &str) -> Option<BandProfile> {
        self.custom_profiles
            .iter()
            .flatten()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .cloned()
            .or_else(|| BandProfile::builtin(key))
    }

    /// Profile named by `key`, falling back to DEFAULT when it is unknown or invalid
    pub fn resolve_profile(&self, key: &str) -> BandProfile {
        match self.find_profile(key) {
            Some(profile) => match profile.validate() {
                Ok(()) => profile,
                Err(e) => {
                    log::warn!("Ignoring profile {}: {}", key, e);
                    BandProfile::default()
                }
            },
            None => {
                log::warn!("Unknown profile {}, using DEFAULT", key);
                BandProfile::default()
            }
        }
    }

    /// Keys of every selectable profile, built-ins first
    pub fn profile_keys(&self) -> Vec<String> {
        BandProfile::builtins()
            .into_iter()
            .map(|p| p.key)
            .chain(self.custom_profiles.iter().flatten().map(|p| p.key.clone()))
            .collect()
    }
}
