//! Band energy extraction from a magnitude spectrum.
//!
//! The spectrum holds the positive-frequency half of a real transform, so `N`
//! bins span `0..sample_rate / 2` and a frequency maps to bin
//! `floor(freq / sample_rate * N * 2)`.

use crate::profile::{BandProfile, FrequencyBand};

/// Full-scale value of a byte spectrum (0-255 per bin)
pub const BYTE_FULL_SCALE: f32 = 255.0;

/// Averages spectrum bins per band and normalizes against full scale
#[derive(Clone, Copy, Debug)]
pub struct BandIntensityExtractor {
    full_scale: f32,
}

impl Default for BandIntensityExtractor {
    fn default() -> Self {
        Self {
            full_scale: BYTE_FULL_SCALE,
        }
    }
}

impl BandIntensityExtractor {
    /// Extractor for spectra whose bins top out at `full_scale`.
    /// Non-positive scales fall back to the byte scale.
    pub fn new(full_scale: f32) -> Self {
        if full_scale > 0.0 && full_scale.is_finite() {
            Self { full_scale }
        } else {
            Self::default()
        }
    }

    pub fn full_scale(&self) -> f32 {
        self.full_scale
    }

    /// Bin index for a frequency. Negative and NaN frequencies map to bin 0.
    pub fn bin_index(freq_hz: f32, sample_rate: f32, bin_count: usize) -> usize {
        (freq_hz / sample_rate * bin_count as f32 * 2.0).floor() as usize
    }

    /// Mean bin value inside the band divided by full scale, in [0, 1].
    ///
    /// Returns 0 for an empty spectrum, a non-positive sample rate, or a band
    /// that covers no bins (below the first bin or above Nyquist).
    pub fn raw_intensity(&self, spectrum: &[f32], band: &FrequencyBand, sample_rate: f32) -> f32 {
        if spectrum.is_empty() || sample_rate.is_nan() || sample_rate <= 0.0 {
            return 0.0;
        }

        let len = spectrum.len();
        let start = Self::bin_index(band.low_hz, sample_rate, len);
        let end = Self::bin_index(band.high_hz, sample_rate, len).min(len);
        if start >= end {
            return 0.0;
        }

        let bins = &spectrum[start..end];
        let sum: f32 = bins.iter().filter(|v| v.is_finite()).map(|v| v.max(0.0)).sum();
        let mean = sum / bins.len() as f32;

        (mean / self.full_scale).clamp(0.0, 1.0)
    }

    /// Raw intensity scaled by the band's static sensitivity. Not bounded above.
    pub fn profile_adjusted(
        &self,
        spectrum: &[f32],
        band: &FrequencyBand,
        sample_rate: f32,
    ) -> f32 {
        self.raw_intensity(spectrum, band, sample_rate) * band.sensitivity
    }

    /// Final intensity when adaptive gain is off
    pub fn static_intensity(&self, spectrum: &[f32], band: &FrequencyBand, sample_rate: f32) -> f32 {
        self.profile_adjusted(spectrum, band, sample_rate)
            .clamp(0.0, 1.0)
    }

    /// Profile-adjusted intensity for every band, in band order
    pub fn extract(&self, spectrum: &[f32], profile: &BandProfile, sample_rate: f32) -> Vec<f32> {
        profile
            .bands
            .iter()
            .map(|band| self.profile_adjusted(spectrum, band, sample_rate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_bin_index_uses_half_spectrum() {
        // 64 bins over 0..22050 Hz -> ~344.5 Hz per bin
        assert_eq!(BandIntensityExtractor::bin_index(0.0, SAMPLE_RATE, 64), 0);
        assert_eq!(BandIntensityExtractor::bin_index(1000.0, SAMPLE_RATE, 64), 2);
        assert_eq!(BandIntensityExtractor::bin_index(22050.0, SAMPLE_RATE, 64), 64);
        assert_eq!(BandIntensityExtractor::bin_index(-50.0, SAMPLE_RATE, 64), 0);
    }

    #[test]
    fn test_constant_spectrum_averages_to_bin_value() {
        let extractor = BandIntensityExtractor::default();
        let spectrum = vec![128.0; 64];
        let band = FrequencyBand::new(0.0, 1000.0, 1.0);

        let raw = extractor.raw_intensity(&spectrum, &band, SAMPLE_RATE);
        assert_abs_diff_eq!(raw, 128.0 / 255.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            extractor.static_intensity(&spectrum, &band, SAMPLE_RATE),
            0.502,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_band_narrower_than_a_bin_is_silent() {
        // 0-100 Hz rounds to the empty range 0..0 with 64 bins
        let extractor = BandIntensityExtractor::default();
        let spectrum = vec![128.0; 64];
        let band = FrequencyBand::new(0.0, 100.0, 1.0);
        assert_eq!(extractor.raw_intensity(&spectrum, &band, SAMPLE_RATE), 0.0);
    }

    #[test]
    fn test_band_above_nyquist_is_silent() {
        let extractor = BandIntensityExtractor::default();
        let spectrum = vec![200.0; 64];
        let band = FrequencyBand::new(23000.0, 30000.0, 1.0);
        assert_eq!(extractor.raw_intensity(&spectrum, &band, SAMPLE_RATE), 0.0);
    }

    #[test]
    fn test_band_past_last_bin_is_truncated() {
        let extractor = BandIntensityExtractor::default();
        let mut spectrum = vec![0.0; 64];
        spectrum[63] = 255.0;
        // 21000 Hz -> bin 60, 30000 Hz -> bin 87 (clipped to 64)
        let band = FrequencyBand::new(21000.0, 30000.0, 1.0);
        assert_abs_diff_eq!(
            extractor.raw_intensity(&spectrum, &band, SAMPLE_RATE),
            0.25,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_empty_spectrum_and_bad_sample_rate() {
        let extractor = BandIntensityExtractor::default();
        let band = FrequencyBand::new(0.0, 1000.0, 1.0);
        assert_eq!(extractor.raw_intensity(&[], &band, SAMPLE_RATE), 0.0);
        assert_eq!(extractor.raw_intensity(&[100.0; 64], &band, 0.0), 0.0);
        assert_eq!(extractor.raw_intensity(&[100.0; 64], &band, f32::NAN), 0.0);
    }

    #[test]
    fn test_sensitivity_scales_and_static_clamps() {
        let extractor = BandIntensityExtractor::default();
        let spectrum = vec![204.0; 64]; // 0.8 of full scale
        let band = FrequencyBand::new(0.0, 1000.0, 1.5);

        let adjusted = extractor.profile_adjusted(&spectrum, &band, SAMPLE_RATE);
        assert_abs_diff_eq!(adjusted, 1.2, epsilon = 1e-5);
        assert_eq!(extractor.static_intensity(&spectrum, &band, SAMPLE_RATE), 1.0);
    }

    #[test]
    fn test_custom_full_scale() {
        let extractor = BandIntensityExtractor::new(1.0);
        let band = FrequencyBand::new(0.0, 1000.0, 1.0);
        assert_abs_diff_eq!(
            extractor.raw_intensity(&[0.25; 64], &band, SAMPLE_RATE),
            0.25,
            epsilon = 1e-6
        );
        assert_eq!(BandIntensityExtractor::new(0.0).full_scale(), BYTE_FULL_SCALE);
    }

    #[test]
    fn test_extract_follows_profile_order() {
        let extractor = BandIntensityExtractor::default();
        let mut spectrum = vec![0.0; 64];
        for bin in spectrum.iter_mut().take(3) {
            *bin = 255.0;
        }
        let profile = BandProfile {
            key: "TWO".to_string(),
            label: String::new(),
            bands: vec![
                FrequencyBand::new(0.0, 1000.0, 0.5),
                FrequencyBand::new(5000.0, 10000.0, 1.0),
            ],
        };

        let values = extractor.extract(&spectrum, &profile, SAMPLE_RATE);
        assert_eq!(values.len(), 2);
        assert_abs_diff_eq!(values[0], 0.5, epsilon = 1e-6);
        assert_eq!(values[1], 0.0);
    }
}
