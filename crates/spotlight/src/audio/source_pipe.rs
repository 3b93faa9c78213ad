//! Audio device capture.
//!
//! Enumerates cpal input and output devices, opens an input stream on the
//! chosen one and keeps the most recent mono samples in a shared ring buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{AudioError, SampleSource};
use crate::utils::Config;

/// Samples retained for analysis (covers the largest common FFT sizes)
pub const BUFFER_SIZE: usize = 4096;

const FALLBACK_SAMPLE_RATE: f32 = 44100.0;

pub struct DeviceInfo {
    pub device: cpal::Device,
    pub name: String,
    pub is_input: bool,
}

impl DeviceInfo {
    fn kind(&self) -> &'static str {
        if self.is_input {
            "input"
        } else {
            "output"
        }
    }
}

pub struct SourcePipe {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    devices: Vec<DeviceInfo>,
    current_device: usize,
    sample_rate: f32,
    _stream: Option<Stream>,
}

impl SourcePipe {
    /// Open `index` if given, else the remembered device, else a sensible default
    pub fn open(config: &Config, index: Option<usize>) -> Result<Self, AudioError> {
        let devices = Self::collect_devices();
        if devices.is_empty() {
            return Err(AudioError::NoDevices);
        }

        let start_index = match index {
            Some(i) if i >= devices.len() => {
                return Err(AudioError::DeviceIndexOutOfRange {
                    index: i,
                    count: devices.len(),
                })
            }
            Some(i) => i,
            None => Self::preferred_device(&devices, config),
        };

        let buffer = Arc::new(Mutex::new(VecDeque::from(vec![0.0; BUFFER_SIZE])));
        let timeout = Duration::from_secs(config.device_timeout_secs());
        let (stream, sample_rate) =
            Self::build_stream(&devices[start_index], Arc::clone(&buffer), timeout)?;

        let info = &devices[start_index];
        log::info!(
            "[{}] Selected: {} ({}) at {} Hz",
            start_index,
            info.name,
            info.kind(),
            sample_rate
        );

        Ok(Self {
            buffer,
            devices,
            current_device: start_index,
            sample_rate,
            _stream: Some(stream),
        })
    }

    fn preferred_device(devices: &[DeviceInfo], config: &Config) -> usize {
        config
            .last_device
            .as_ref()
            .and_then(|name| {
                let is_input = config.last_device_is_input.unwrap_or(false);
                devices
                    .iter()
                    .position(|d| d.name == *name && d.is_input == is_input)
            })
            .or_else(|| {
                // PipeWire/Pulse inputs are the most reliable capture path on Linux
                devices
                    .iter()
                    .position(|d| d.is_input && d.name == "pipewire")
            })
            .or_else(|| devices.iter().position(|d| d.is_input && d.name == "pulse"))
            .or_else(|| {
                let host = cpal::default_host();
                let default_input = host.default_input_device().and_then(|d| d.name().ok());
                default_input.and_then(|name| devices.iter().position(|d| d.is_input && d.name == name))
            })
            .unwrap_or(0)
    }

    pub fn list_devices() {
        let devices = Self::collect_devices();
        println!("\n=== Audio Devices ===");
        for (idx, info) in devices.iter().enumerate() {
            println!("  [{}] {} ({})", idx, info.name, info.kind());
        }
        println!("Use --device N to pick one\n");
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            devices.extend(input_devices.filter_map(|device| {
                device.name().ok().map(|name| DeviceInfo {
                    device,
                    name,
                    is_input: true,
                })
            }));
        }

        if let Ok(output_devices) = host.output_devices() {
            devices.extend(output_devices.filter_map(|device| {
                device.name().ok().map(|name| DeviceInfo {
                    device,
                    name,
                    is_input: false,
                })
            }));
        }

        devices
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        is_input: bool,
        timeout: Duration,
    ) -> Result<StreamConfig, AudioError> {
        let device_clone = device.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Ok(config.into()),
            Ok(Err(e)) => Err(AudioError::ConfigError(e.to_string())),
            Err(_) => Err(AudioError::ConfigTimeout(timeout)),
        }
    }

    fn build_stream(
        device_info: &DeviceInfo,
        audio_buffer: Arc<Mutex<VecDeque<f32>>>,
        timeout: Duration,
    ) -> Result<(Stream, f32), AudioError> {
        let stream_config =
            Self::get_config_with_timeout(&device_info.device, device_info.is_input, timeout)?;
        let channels = stream_config.channels.max(1) as usize;
        let sample_rate = stream_config.sample_rate.0 as f32;

        let err_fn = |err| log::error!("Audio stream error: {}", err);

        let stream = device_info
            .device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let Ok(mut buffer) = audio_buffer.lock() else {
                        return;
                    };
                    for frame in data.chunks(channels) {
                        let sample = frame.iter().sum::<f32>() / channels as f32;
                        buffer.pop_front();
                        buffer.push_back(sample);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        let sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            FALLBACK_SAMPLE_RATE
        };
        Ok((stream, sample_rate))
    }

    /// Store the open device as the one to reuse on the next start
    pub fn remember_device(&self, config: &mut Config) {
        let info = &self.devices[self.current_device];
        config.set_device(&info.name, info.is_input);
    }

    pub fn current_device_name(&self) -> &str {
        &self.devices[self.current_device].name
    }
}

impl SampleSource for SourcePipe {
    fn samples(&mut self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|buffer| buffer.iter().copied().collect())
            .unwrap_or_default()
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
