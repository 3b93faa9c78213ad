//! Synthetic test signal for running without an audio device.
//!
//! Four-on-the-floor kick at 120 BPM, a bass line, a mid pad and off-beat
//! hi-hat noise, so every band of the built-in profiles sees some movement.

use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::TAU;

use super::SampleSource;

const BEAT_SECS: f32 = 0.5;
const BUFFER_SIZE: usize = 4096;

pub struct SynthSource {
    sample_rate: f32,
    samples_per_frame: usize,
    /// Samples generated so far
    clock: u64,
    buffer: VecDeque<f32>,
}

impl SynthSource {
    pub fn new(sample_rate: f32, fps: u32) -> Self {
        let samples_per_frame = (sample_rate / fps.max(1) as f32).round().max(1.0) as usize;
        Self {
            sample_rate,
            samples_per_frame,
            clock: 0,
            buffer: VecDeque::from(vec![0.0; BUFFER_SIZE]),
        }
    }

    fn next_sample(&mut self, rng: &mut impl Rng) -> f32 {
        let t = self.clock as f32 / self.sample_rate;
        self.clock += 1;

        let beat_pos = t % BEAT_SECS;
        let kick = (TAU * 55.0 * beat_pos).sin() * (-beat_pos * 18.0).exp();

        let bar = (t / (BEAT_SECS * 4.0)) as u32 % 2;
        let bass_hz = if bar == 0 { 98.0 } else { 130.8 };
        let bass = 0.25 * (TAU * bass_hz * t).sin();

        let pad = 0.08 * ((TAU * 440.0 * t).sin() + (TAU * 660.0 * t).sin());

        let offbeat = (t + BEAT_SECS / 2.0) % BEAT_SECS;
        let hat = rng.random_range(-1.0f32..1.0) * 0.2 * (-offbeat * 60.0).exp();

        (0.6 * kick + bass + pad + hat).clamp(-1.0, 1.0)
    }
}

impl SampleSource for SynthSource {
    fn samples(&mut self) -> Vec<f32> {
        let mut rng = rand::rng();
        for _ in 0..self.samples_per_frame {
            let sample = self.next_sample(&mut rng);
            self.buffer.pop_front();
            self.buffer.push_back(sample);
        }
        self.buffer.iter().copied().collect()
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_one_frame_per_call() {
        let mut synth = SynthSource::new(48000.0, 60);
        let first = synth.samples();
        assert_eq!(first.len(), BUFFER_SIZE);
        assert_eq!(synth.clock, 800);
        synth.samples();
        assert_eq!(synth.clock, 1600);
    }

    #[test]
    fn test_signal_is_bounded_and_not_silent() {
        let mut synth = SynthSource::new(44100.0, 60);
        let mut peak = 0.0f32;
        for _ in 0..60 {
            for s in synth.samples() {
                assert!((-1.0..=1.0).contains(&s));
                peak = peak.max(s.abs());
            }
        }
        assert!(peak > 0.3);
    }
}
