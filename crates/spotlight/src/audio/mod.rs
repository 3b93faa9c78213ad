mod analyzer;
mod error;
mod source_pipe;
mod synth;

pub use analyzer::{SpectrumAnalyzer, DEFAULT_FFT_SIZE};
pub use error::AudioError;
pub use source_pipe::SourcePipe;
pub use synth::SynthSource;

/// Anything that can hand the frame loop its newest mono samples
pub trait SampleSource {
    /// Most recent samples, oldest first
    fn samples(&mut self) -> Vec<f32>;

    fn sample_rate(&self) -> f32;
}
