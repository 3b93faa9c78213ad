//! Terminal meter: one line per frame, one spotlight per band.
//!
//! Each band shows its label, the intensity as a percentage and a bar in the
//! band's color. Labels turn yellow above 80%.

use spotlight_core::BandProfile;
use std::io::{self, Write};

const BAR_WIDTH: usize = 8;
const HOT_THRESHOLD: f32 = 0.8;
const HOT_RGB: (u8, u8, u8) = (255, 255, 0);
const LABEL_RGB: (u8, u8, u8) = (255, 255, 255);

/// `#RRGGBB` (or `RRGGBB`) to an RGB triple
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn percent(intensity: f32) -> u32 {
    (intensity.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn bar(intensity: f32) -> String {
    let filled = (intensity.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

fn paint(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, text)
}

/// Render one frame. Bands without a matching intensity show 0%.
pub fn format_meter(profile: &BandProfile, intensities: &[f32], color: bool) -> String {
    profile
        .bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let intensity = intensities.get(i).copied().unwrap_or(0.0);
            let label = format!("{} {:>3}%", band.name, percent(intensity));
            let bar = bar(intensity);

            if color {
                let label_rgb = if intensity > HOT_THRESHOLD {
                    HOT_RGB
                } else {
                    LABEL_RGB
                };
                let band_rgb = parse_hex_color(&band.color).unwrap_or(LABEL_RGB);
                format!("{} {}", paint(&label, label_rgb), paint(&bar, band_rgb))
            } else {
                format!("{} {}", label, bar)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub struct Meter {
    color: bool,
}

impl Meter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Redraw the meter line in place
    pub fn draw(&self, profile: &BandProfile, intensities: &[f32]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(
            out,
            "\r\x1b[2K{}",
            format_meter(profile, intensities, self.color)
        )?;
        out.flush()
    }

    /// Move past the meter line so later output starts clean
    pub fn finish(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlight_core::FrequencyBand;

    fn profile() -> BandProfile {
        BandProfile {
            key: "T".to_string(),
            label: String::new(),
            bands: vec![
                FrequencyBand::new(0.0, 100.0, 1.0).named("Bass", "#FF0000"),
                FrequencyBand::new(100.0, 1000.0, 1.0).named("Mid", "#32CD32"),
            ],
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#8B0000"), Some((0x8B, 0, 0)));
        assert_eq!(parse_hex_color("1E90FF"), Some((0x1E, 0x90, 0xFF)));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn test_percent_rounds_and_clamps() {
        assert_eq!(percent(0.502), 50);
        assert_eq!(percent(0.996), 100);
        assert_eq!(percent(1.7), 100);
        assert_eq!(percent(-0.2), 0);
    }

    #[test]
    fn test_plain_meter_line() {
        let line = format_meter(&profile(), &[0.5, 1.0], false);
        assert_eq!(line, "Bass  50% ████···· | Mid 100% ████████");
    }

    #[test]
    fn test_missing_intensity_shows_zero() {
        let line = format_meter(&profile(), &[0.25], false);
        assert!(line.ends_with("Mid   0% ········"));
    }

    #[test]
    fn test_hot_band_label_turns_yellow() {
        let line = format_meter(&profile(), &[0.9, 0.1], true);
        assert!(line.starts_with("\x1b[38;2;255;255;0mBass  90%"));
        assert!(line.contains("\x1b[38;2;255;0;0m"));
        assert!(line.contains("\x1b[38;2;255;255;255mMid  10%"));
    }
}
