//! Byte magnitude spectrum, browser-analyser style.
//!
//! Windows the newest `fft_size` samples, runs a forward FFT, smooths the
//! magnitudes over time and maps them from decibels onto 0-255. The result has
//! `fft_size / 2` bins covering 0..sample_rate/2.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use super::AudioError;

pub const DEFAULT_FFT_SIZE: usize = 128;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    bytes: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize) -> Result<Self, AudioError> {
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(AudioError::InvalidFftSize(fft_size));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window
        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = 2.0 * std::f32::consts::PI * i as f32 / n;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Ok(Self {
            fft,
            fft_size,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            window,
            smoothed: vec![0.0; fft_size / 2],
            bytes: vec![0.0; fft_size / 2],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Analyze the newest samples. Short input is zero-padded at the front.
    pub fn analyze(&mut self, samples: &[f32]) -> &[f32] {
        let take = samples.len().min(self.fft_size);
        let tail = &samples[samples.len() - take..];
        let pad = self.fft_size - take;

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 1.0 / self.fft_size as f32;
        let db_range = MAX_DECIBELS - MIN_DECIBELS;

        for k in 0..self.bin_count() {
            let magnitude = self.fft_buffer[k].norm() * scale;
            let smoothed = SMOOTHING_TIME_CONSTANT * self.smoothed[k]
                + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
            self.smoothed[k] = if smoothed.is_finite() { smoothed } else { 0.0 };

            let db = 20.0 * self.smoothed[k].max(1e-12).log10();
            let scaled = 255.0 / db_range * (db - MIN_DECIBELS);
            self.bytes[k] = scaled.floor().clamp(0.0, 255.0);
        }

        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_rejects_bad_fft_size() {
        assert!(SpectrumAnalyzer::new(100).is_err());
        assert!(SpectrumAnalyzer::new(16).is_err());
        assert!(SpectrumAnalyzer::new(65536).is_err());
        assert_eq!(SpectrumAnalyzer::new(128).unwrap().bin_count(), 64);
    }

    #[test]
    fn test_silence_is_zero() {
        let mut analyzer = SpectrumAnalyzer::new(DEFAULT_FFT_SIZE).unwrap();
        let spectrum = analyzer.analyze(&[0.0; 256]);
        assert_eq!(spectrum.len(), 64);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let sample_rate = 44100.0;
        let mut analyzer = SpectrumAnalyzer::new(1024).unwrap();
        // Bin 40 of a 1024-point transform
        let freq = 40.0 * sample_rate / 1024.0;
        // Quiet enough that the main lobe stays below the byte ceiling
        let samples = sine(freq, sample_rate, 1024, 0.004);

        let mut spectrum = Vec::new();
        for _ in 0..30 {
            spectrum = analyzer.analyze(&samples).to_vec();
        }

        let peak_bin = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, 40);
        assert!(spectrum[40] > spectrum[39] && spectrum[40] > spectrum[41]);
        assert!(spectrum[40] > 100.0);
        assert_eq!(spectrum[100], 0.0);
        assert!(spectrum.iter().all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn test_short_input_is_padded() {
        let mut analyzer = SpectrumAnalyzer::new(256).unwrap();
        let spectrum = analyzer.analyze(&[0.5; 10]);
        assert_eq!(spectrum.len(), 128);
    }
}
