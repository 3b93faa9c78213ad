//! Frequency band profiles.
//!
//! A profile is an ordered list of frequency ranges, each with a static
//! sensitivity tuned for a style of music. Band order defines the band index
//! used by the adaptive gain controller, so swapping profiles invalidates any
//! per-band state keyed on it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::ProfileError;

/// Keys of the built-in profiles, in menu order
pub const BUILTIN_PROFILE_KEYS: [&str; 5] =
    ["DEFAULT", "ROCK", "ELECTRONIC", "CLASSICAL", "MORRICONE"];

/// One frequency range of a profile
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrequencyBand {
    /// Lower edge in Hz (inclusive)
    pub low_hz: f32,
    /// Upper edge in Hz (exclusive)
    pub high_hz: f32,
    /// Static gain applied to the raw band energy (1.0 = unchanged)
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Display label
    #[serde(default)]
    pub name: String,
    /// Display color as `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_sensitivity() -> f32 {
    1.0
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

impl FrequencyBand {
    pub fn new(low_hz: f32, high_hz: f32, sensitivity: f32) -> Self {
        Self {
            low_hz,
            high_hz,
            sensitivity,
            name: String::new(),
            color: default_color(),
        }
    }

    pub fn named(mut self, name: &str, color: &str) -> Self {
        self.name = name.to_string();
        self.color = color.to_string();
        self
    }
}

/// An ordered set of bands with a lookup key and a human label
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BandProfile {
    pub key: String,
    #[serde(default)]
    pub label: String,
    pub bands: Vec<FrequencyBand>,
}

type BandRow = (f32, f32, &'static str, &'static str, f32);

// (low_hz, high_hz, color, name, sensitivity)
const DEFAULT_BANDS: [BandRow; 6] = [
    (0.0, 60.0, "#8B0000", "Sub Bass", 1.0),
    (60.0, 120.0, "#FF0000", "Bass", 1.0),
    (120.0, 200.0, "#FF4500", "Bass Harmonics", 1.0),
    (200.0, 800.0, "#FFD700", "Low-Mid", 1.0),
    (800.0, 3500.0, "#32CD32", "Mid", 1.0),
    (3500.0, 22050.0, "#1E90FF", "High", 1.0),
];

const ROCK_BANDS: [BandRow; 6] = [
    (0.0, 60.0, "#8B0000", "Kick", 0.4),
    (60.0, 120.0, "#FF0000", "Bass Guitar", 0.6),
    (120.0, 200.0, "#FF4500", "Low Tom", 0.7),
    (200.0, 800.0, "#FFD700", "Rhythm Guitar", 0.9),
    (800.0, 3500.0, "#32CD32", "Vocals", 1.1),
    (3500.0, 22050.0, "#1E90FF", "Cymbals", 1.0),
];

const ELECTRONIC_BANDS: [BandRow; 6] = [
    (0.0, 60.0, "#8B0000", "Sub", 0.2),
    (60.0, 120.0, "#FF0000", "Kick", 0.4),
    (120.0, 200.0, "#FF4500", "Bass", 0.6),
    (200.0, 800.0, "#FFD700", "Synth", 0.8),
    (800.0, 3500.0, "#32CD32", "Lead", 1.2),
    (3500.0, 22050.0, "#1E90FF", "Hi-Hats", 1.5),
];

const CLASSICAL_BANDS: [BandRow; 6] = [
    (0.0, 80.0, "#5D4037", "Basses", 0.7),
    (80.0, 200.0, "#8D6E63", "Cellos", 0.9),
    (200.0, 600.0, "#D7CCC8", "Violas", 1.0),
    (600.0, 1200.0, "#FFD54F", "Violins", 1.2),
    (1200.0, 5000.0, "#4FC3F7", "Soloists", 1.1),
    (5000.0, 22050.0, "#E1F5FE", "Sparkle", 1.0),
];

const MORRICONE_BANDS: [BandRow; 6] = [
    (0.0, 80.0, "#8B4513", "Contrabass", 0.8),
    (80.0, 200.0, "#CD853F", "Cellos", 0.9),
    (200.0, 600.0, "#DAA520", "Violas", 1.0),
    (600.0, 1200.0, "#FFD700", "Violins", 1.1),
    (1200.0, 3500.0, "#87CEEB", "Solo Violin", 1.2),
    (3500.0, 22050.0, "#FFFFFF", "Piccolo", 1.0),
];

impl BandProfile {
    fn from_rows(key: &str, label: &str, rows: &[BandRow]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            bands: rows
                .iter()
                .map(|&(low, high, color, name, sensitivity)| {
                    FrequencyBand::new(low, high, sensitivity).named(name, color)
                })
                .collect(),
        }
    }

    /// Look up a built-in profile by key (case-insensitive)
    pub fn builtin(key: &str) -> Option<Self> {
        let profile = match key.to_ascii_uppercase().as_str() {
            "DEFAULT" => Self::from_rows("DEFAULT", "Default", &DEFAULT_BANDS),
            "ROCK" => Self::from_rows("ROCK", "Rock", &ROCK_BANDS),
            "ELECTRONIC" => Self::from_rows("ELECTRONIC", "Electronic", &ELECTRONIC_BANDS),
            "CLASSICAL" => Self::from_rows("CLASSICAL", "Classical", &CLASSICAL_BANDS),
            "MORRICONE" => Self::from_rows("MORRICONE", "Morricone", &MORRICONE_BANDS),
            _ => return None,
        };
        Some(profile)
    }

    /// Built-in profile by key, falling back to `DEFAULT` for unknown keys
    pub fn by_key_or_default(key: &str) -> Self {
        Self::builtin(key).unwrap_or_default()
    }

    /// All built-in profiles in menu order
    pub fn builtins() -> Vec<Self> {
        BUILTIN_PROFILE_KEYS
            .iter()
            .filter_map(|key| Self::builtin(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Check that every band has an ordered range and a usable sensitivity.
    ///
    /// Overlapping or non-contiguous bands are allowed.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.bands.is_empty() {
            return Err(ProfileError::Empty(self.key.clone()));
        }

        for (index, band) in self.bands.iter().enumerate() {
            if band.low_hz.partial_cmp(&band.high_hz) != Some(Ordering::Less) {
                return Err(ProfileError::InvertedRange {
                    index,
                    name: band.name.clone(),
                    low_hz: band.low_hz,
                    high_hz: band.high_hz,
                });
            }
            if !band.sensitivity.is_finite() || band.sensitivity < 0.0 {
                return Err(ProfileError::InvalidSensitivity {
                    index,
                    name: band.name.clone(),
                    sensitivity: band.sensitivity,
                });
            }
        }

        Ok(())
    }
}

impl Default for BandProfile {
    fn default() -> Self {
        Self::from_rows("DEFAULT", "Default", &DEFAULT_BANDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        let profiles = BandProfile::builtins();
        assert_eq!(profiles.len(), BUILTIN_PROFILE_KEYS.len());
        for profile in &profiles {
            assert_eq!(profile.len(), 6);
            assert!(profile.validate().is_ok(), "{} failed validation", profile.key);
        }
    }

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let rock = BandProfile::builtin("rock").unwrap();
        assert_eq!(rock.key, "ROCK");
        assert_eq!(rock.bands[0].name, "Kick");
        assert_eq!(rock.bands[0].sensitivity, 0.4);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        assert!(BandProfile::builtin("polka").is_none());
        assert_eq!(BandProfile::by_key_or_default("polka"), BandProfile::default());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let profile = BandProfile {
            key: "BROKEN".to_string(),
            label: String::new(),
            bands: vec![
                FrequencyBand::new(0.0, 100.0, 1.0),
                FrequencyBand::new(500.0, 500.0, 1.0).named("Flat", "#000000"),
            ],
        };
        assert_eq!(
            profile.validate(),
            Err(ProfileError::InvertedRange {
                index: 1,
                name: "Flat".to_string(),
                low_hz: 500.0,
                high_hz: 500.0,
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_sensitivity_and_empty() {
        let mut profile = BandProfile {
            key: "X".to_string(),
            label: String::new(),
            bands: vec![FrequencyBand::new(0.0, 100.0, -0.5)],
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidSensitivity { index: 0, .. })
        ));

        profile.bands.clear();
        assert_eq!(profile.validate(), Err(ProfileError::Empty("X".to_string())));
    }

    #[test]
    fn test_overlapping_bands_are_allowed() {
        let profile = BandProfile {
            key: "OVERLAP".to_string(),
            label: String::new(),
            bands: vec![
                FrequencyBand::new(0.0, 1000.0, 1.0),
                FrequencyBand::new(500.0, 2000.0, 1.0),
            ],
        };
        assert!(profile.validate().is_ok());
    }
}
