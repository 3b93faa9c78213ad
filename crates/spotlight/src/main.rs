mod args;
mod audio;
mod ui;
mod utils;

use anyhow::Context;
use args::{Args, USAGE};
use audio::{SampleSource, SourcePipe, SpectrumAnalyzer, SynthSource};
use spotlight_core::IntensityEngine;
use std::time::{Duration, Instant};
use ui::Meter;
use utils::{Config, ConfigWatcher};

const SYNTH_SAMPLE_RATE: f32 = 44100.0;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug for verbose output; logs go to stderr, the meter to stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    if args.help {
        print!("{}", USAGE);
        return Ok(());
    }
    if args.list_devices {
        SourcePipe::list_devices();
        return Ok(());
    }

    let mut config = Config::load();

    if args.list_profiles {
        list_profiles(&config);
        return Ok(());
    }

    let mut app = App::new(args, &mut config)?;
    app.run()
}

fn list_profiles(config: &Config) {
    println!("\n=== Profiles ===");
    for key in config.profile_keys() {
        let profile = config.resolve_profile(&key);
        let bands: Vec<&str> = profile.bands.iter().map(|b| b.name.as_str()).collect();
        println!("  {:<12} {:<12} {}", key, profile.label, bands.join(", "));
    }
    println!();
}

struct App {
    args: Args,
    engine: IntensityEngine,
    source: Box<dyn SampleSource>,
    analyzer: SpectrumAnalyzer,
    meter: Meter,
    watcher: Option<ConfigWatcher>,
    frame_duration: Duration,
    fps: u32,
    /// Last applied config, to tell which fields a reload changed
    config: Config,
}

impl App {
    fn new(args: Args, config: &mut Config) -> anyhow::Result<Self> {
        let profile_key = args
            .profile
            .clone()
            .unwrap_or_else(|| config.profile_key().to_string());
        let profile = config.resolve_profile(&profile_key);
        log::info!("Profile: {} ({})", profile.key, profile.label);

        let mut engine = IntensityEngine::new(profile)
            .with_adaptive_config(config.adaptive_config())
            .context("invalid adaptive sensitivity settings")?;
        engine.set_adaptive(args.adaptive.unwrap_or(config.adaptive()));

        let fps = config.fps();
        let source: Box<dyn SampleSource> = if args.synth {
            log::info!("Using synthetic test signal");
            Box::new(SynthSource::new(SYNTH_SAMPLE_RATE, fps))
        } else {
            let pipe = SourcePipe::open(config, args.device).context("failed to open audio input")?;
            if args.device.is_some() {
                pipe.remember_device(config);
            }
            log::info!("Capturing from {}", pipe.current_device_name());
            Box::new(pipe)
        };

        let analyzer = SpectrumAnalyzer::new(config.fft_size())?;
        log::info!(
            "Analyser: {} point FFT, {} bins at {} Hz",
            analyzer.fft_size(),
            analyzer.bin_count(),
            source.sample_rate()
        );

        Ok(Self {
            meter: Meter::new(!args.no_color),
            args,
            engine,
            source,
            analyzer,
            watcher: ConfigWatcher::for_home(),
            frame_duration: Duration::from_secs_f32(1.0 / fps as f32),
            fps,
            config: config.clone(),
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let mut frame: u64 = 0;

        loop {
            let started = Instant::now();
            frame += 1;

            self.update(frame)?;

            if self.args.frames.is_some_and(|limit| frame >= limit) {
                break;
            }

            let elapsed = started.elapsed();
            if elapsed < self.frame_duration {
                std::thread::sleep(self.frame_duration - elapsed);
            }
        }

        self.meter.finish()?;
        Ok(())
    }

    fn update(&mut self, frame: u64) -> anyhow::Result<()> {
        let samples = self.source.samples();
        let spectrum = self.analyzer.analyze(&samples);
        let intensities = self.engine.process(spectrum, self.source.sample_rate());

        self.meter.draw(self.engine.profile(), &intensities)?;

        if self.args.debug_bands && frame % self.fps as u64 == 0 {
            self.log_band_info();
        }

        if let Some(new_config) = self.watcher.as_mut().and_then(|w| w.check_reload()) {
            self.apply_config(new_config);
        }

        Ok(())
    }

    fn log_band_info(&self) {
        for (i, band) in self.engine.profile().bands.iter().enumerate() {
            if let Some(info) = self.engine.band_info(i) {
                log::debug!(
                    "{:<14} sensitivity {:.3}  average {:.3}  peak {:.3}",
                    band.name,
                    info.sensitivity,
                    info.average_level,
                    info.recent_peak
                );
            }
        }
    }

    /// Re-apply the parts of a reloaded config that the command line did not pin
    fn apply_config(&mut self, new_config: Config) {
        if self.args.profile.is_none()
            && (new_config.profile != self.config.profile
                || new_config.custom_profiles != self.config.custom_profiles)
        {
            let profile = new_config.resolve_profile(new_config.profile_key());
            self.engine.set_profile(profile);
        }

        let adaptive_config = new_config.adaptive_config();
        if adaptive_config != *self.engine.adaptive_config() {
            if let Err(e) = self.engine.set_adaptive_config(adaptive_config) {
                log::warn!("Keeping previous adaptive settings: {}", e);
            }
        }

        if self.args.adaptive.is_none() {
            self.engine.set_adaptive(new_config.adaptive());
        }

        if new_config.fft_size() != self.analyzer.fft_size() {
            match SpectrumAnalyzer::new(new_config.fft_size()) {
                Ok(analyzer) => self.analyzer = analyzer,
                Err(e) => log::warn!("Keeping {} point FFT: {}", self.analyzer.fft_size(), e),
            }
        }

        self.config = new_config;
    }
}
