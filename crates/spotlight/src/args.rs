//! Command line flags.

use thiserror::Error;

pub const USAGE: &str = "\
Usage: spotlight [OPTIONS]

Options:
  --profile KEY      Band profile (DEFAULT, ROCK, ELECTRONIC, CLASSICAL, MORRICONE or custom)
  --adaptive         Enable adaptive sensitivity
  --static           Disable adaptive sensitivity even if the config enables it
  --synth            Use the built-in test signal instead of an audio device
  --device N         Capture from device N (see --list-devices)
  --frames N         Stop after N frames
  --debug-bands      Log per-band gain diagnostics once a second
  --no-color         Plain meter output
  --list-devices     Print audio devices and exit
  --list-profiles    Print profiles and exit
  -h, --help         Print this help
";

#[derive(Error, Debug, PartialEq)]
pub enum ArgsError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),

    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unknown argument '{0}'")]
    Unknown(String),
}

#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub profile: Option<String>,
    /// `Some` when forced on or off from the command line
    pub adaptive: Option<bool>,
    pub synth: bool,
    pub device: Option<usize>,
    pub frames: Option<u64>,
    pub debug_bands: bool,
    pub no_color: bool,
    pub list_devices: bool,
    pub list_profiles: bool,
    pub help: bool,
}

impl Args {
    /// Parse flags, excluding the program name
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--profile" => {
                    parsed.profile = Some(iter.next().ok_or(ArgsError::MissingValue("--profile"))?)
                }
                "--adaptive" => parsed.adaptive = Some(true),
                "--static" => parsed.adaptive = Some(false),
                "--synth" => parsed.synth = true,
                "--device" => parsed.device = Some(parse_number(&mut iter, "--device")?),
                "--frames" => parsed.frames = Some(parse_number(&mut iter, "--frames")?),
                "--debug-bands" => parsed.debug_bands = true,
                "--no-color" => parsed.no_color = true,
                "--list-devices" => parsed.list_devices = true,
                "--list-profiles" => parsed.list_profiles = true,
                "-h" | "--help" => parsed.help = true,
                _ => return Err(ArgsError::Unknown(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_number<T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = iter.next().ok_or(ArgsError::MissingValue(flag))?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue { flag, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "--profile", "rock", "--adaptive", "--synth", "--device", "3", "--frames", "600",
            "--debug-bands", "--no-color",
        ])
        .unwrap();
        assert_eq!(args.profile.as_deref(), Some("rock"));
        assert_eq!(args.adaptive, Some(true));
        assert!(args.synth);
        assert_eq!(args.device, Some(3));
        assert_eq!(args.frames, Some(600));
        assert!(args.debug_bands);
        assert!(args.no_color);
    }

    #[test]
    fn test_last_adaptive_flag_wins() {
        assert_eq!(parse(&["--adaptive", "--static"]).unwrap().adaptive, Some(false));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&["--profile"]), Err(ArgsError::MissingValue("--profile")));
        assert_eq!(
            parse(&["--device", "two"]),
            Err(ArgsError::InvalidValue {
                flag: "--device",
                value: "two".to_string()
            })
        );
        assert_eq!(parse(&["--loud"]), Err(ArgsError::Unknown("--loud".to_string())));
    }
}
