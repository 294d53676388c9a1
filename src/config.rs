//! Configuration management

use crate::error::{WavlabError, Result};
use crate::filter::FilterSpec;
use crate::inspect::InspectMode;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filter: FilterSpec,
    pub inspect: InspectConfig,
    pub response: ResponseConfig,
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub path: PathBuf,
    pub mode: InspectMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Number of frequency points evaluated over [0, pi)
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub magnitude_range: (f64, f64),
    pub phase_range: (f64, f64),
    pub y_ticks: usize,
    /// Dense enough to show the stopband cutoff
    pub x_ticks: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("media"),
            mode: InspectMode::Auto,
        }
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self { points: 512 }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            magnitude_range: (-120.0, 20.0),
            phase_range: (-6.0, 1.0),
            y_ticks: 8,
            x_ticks: 24,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "wavlab", about = "WAV inspection and IIR lowpass design", version, author)]
pub struct Args {
    #[arg(short = 'v', long = "verbose", global = true, help = "Enable verbose output mode")]
    pub verbose: bool,

    #[arg(short = 'c', long = "config", global = true, help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print WAV header parameters of a file or of every .wav file in a directory
    Info {
        #[arg(help = "WAV file or directory (defaults to inspect.path from config)")]
        path: Option<PathBuf>,

        #[arg(short = 'm', long = "mode", value_enum, help = "Treat the path as a single file or a directory")]
        mode: Option<InspectMode>,

        #[arg(long = "json", help = "Print reports as JSON")]
        json: bool,
    },

    /// Design the lowpass filter and print its coefficients
    Design {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long = "points", help = "Frequency response points")]
        points: Option<usize>,

        #[arg(long = "json", help = "Print design and response as JSON")]
        json: bool,
    },

    /// Design the lowpass filter and show its frequency response (blocks until closed)
    Plot {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long = "points", help = "Frequency response points")]
        points: Option<usize>,
    },

    /// Run a WAV file through the designed lowpass filter
    Filter {
        #[arg(short = 'i', long = "input", help = "Input audio file path (WAV format)")]
        input: PathBuf,

        #[arg(short = 'o', long = "output", help = "Output audio file path")]
        output: PathBuf,

        #[arg(long = "mix", default_value = "1.0", help = "Wet/dry mix (0.0 - 1.0)")]
        mix: f32,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Play a WAV file through the designed lowpass filter with a level meter
    Play {
        #[arg(short = 'i', long = "input", help = "Input audio file path (WAV format)")]
        input: PathBuf,

        #[arg(long = "mix", default_value = "1.0", help = "Wet/dry mix (0.0 - 1.0)")]
        mix: f32,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Write the default configuration to a TOML file
    InitConfig {
        path: PathBuf,
    },
}

/// Command line overrides for the filter band edges and tolerances
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    #[arg(long = "fs", help = "Sampling frequency (Hz)")]
    pub sampling_frequency: Option<f64>,

    #[arg(long = "passband", help = "Passband edge frequency (Hz)")]
    pub passband_edge: Option<f64>,

    #[arg(long = "stopband", help = "Stopband edge frequency (Hz)")]
    pub stopband_edge: Option<f64>,

    #[arg(long = "gpass", help = "Maximum passband loss (dB)")]
    pub passband_max_loss: Option<f64>,

    #[arg(long = "gstop", help = "Minimum stopband attenuation (dB)")]
    pub stopband_min_attenuation: Option<f64>,
}

impl FilterArgs {
    pub fn apply(&self, spec: &mut FilterSpec) {
        if let Some(v) = self.sampling_frequency { spec.sampling_frequency = v; }
        if let Some(v) = self.passband_edge { spec.passband_edge = v; }
        if let Some(v) = self.stopband_edge { spec.stopband_edge = v; }
        if let Some(v) = self.passband_max_loss { spec.passband_max_loss = v; }
        if let Some(v) = self.stopband_min_attenuation { spec.stopband_min_attenuation = v; }
    }
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: &Args) -> Result<Self> {
        // First load config file (if provided)
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        match &args.command {
            Command::Info { path, mode, .. } => {
                if let Some(path) = path {
                    config.inspect.path = path.clone();
                }
                if let Some(mode) = mode {
                    config.inspect.mode = *mode;
                }
            }
            Command::Design { filter, points, .. } | Command::Plot { filter, points } => {
                filter.apply(&mut config.filter);
                if let Some(points) = points {
                    config.response.points = *points;
                }
            }
            Command::Filter { filter, .. } | Command::Play { filter, .. } => filter.apply(&mut config.filter),
            Command::InitConfig { .. } => {}
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WavlabError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| WavlabError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        self.filter
            .validate()
            .map_err(|e| WavlabError::config(e.to_string()))?;

        if self.response.points == 0 {
            return Err(WavlabError::config("Response point count must be greater than 0"));
        }

        let (mag_lo, mag_hi) = self.plot.magnitude_range;
        if mag_lo >= mag_hi {
            return Err(WavlabError::config("Magnitude range must be increasing"));
        }
        let (ph_lo, ph_hi) = self.plot.phase_range;
        if ph_lo >= ph_hi {
            return Err(WavlabError::config("Phase range must be increasing"));
        }

        if self.plot.y_ticks < 2 || self.plot.x_ticks < 2 {
            return Err(WavlabError::config("Axes need at least 2 ticks"));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| WavlabError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| WavlabError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filter.sampling_frequency, 44100.0);
        assert_eq!(config.filter.passband_edge, 1000.0);
        assert_eq!(config.filter.stopband_edge, 1200.0);
        assert_eq!(config.filter.passband_max_loss, 1.0);
        assert_eq!(config.filter.stopband_min_attenuation, 40.0);
        assert_eq!(config.response.points, 512);
        assert_eq!(config.plot.y_ticks, 8);
        assert_eq!(config.plot.x_ticks, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.response.points = 0;
        assert!(config.validate().is_err());
        config.response.points = 512;

        config.plot.magnitude_range = (20.0, -120.0);
        assert!(config.validate().is_err());
        config.plot.magnitude_range = (-120.0, 20.0);

        config.filter.stopband_edge = 900.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.filter.passband_edge = 2000.0;
        config.filter.stopband_edge = 2500.0;

        assert!(config.save_to_file(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[filter]\npassband_edge = 500.0\nstopband_edge = 700.0\n").unwrap();

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded.filter.passband_edge, 500.0);
        assert_eq!(loaded.filter.sampling_frequency, 44100.0);
        assert_eq!(loaded.response.points, 512);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from(["wavlab", "design", "--passband", "3000", "--stopband", "3500", "--points", "64"]);
        let config = Config::from_args_and_config(&args).unwrap();
        assert_eq!(config.filter.passband_edge, 3000.0);
        assert_eq!(config.filter.stopband_edge, 3500.0);
        assert_eq!(config.response.points, 64);

        let args = Args::parse_from(["wavlab", "play", "-i", "take.wav", "--mix", "0.5", "--stopband", "1500"]);
        let config = Config::from_args_and_config(&args).unwrap();
        assert_eq!(config.filter.stopband_edge, 1500.0);
        assert!(matches!(args.command, Command::Play { mix, .. } if mix == 0.5));

        let args = Args::parse_from(["wavlab", "info", "clips", "--mode", "dir"]);
        let config = Config::from_args_and_config(&args).unwrap();
        assert_eq!(config.inspect.path, PathBuf::from("clips"));
        assert_eq!(config.inspect.mode, InspectMode::Directory);
    }
}
