//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{StfilterError, StfilterResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input used when none is given on the command line.
    pub default_input: PathBuf,

    /// Filter branch settings.
    pub pipeline: PipelineDefaults,

    /// Output writing settings.
    pub output: OutputConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Which reslice volume feeds each filter branch.
///
/// Axis names are `"x"` or `"y"`; they are parsed by the core crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Volume fed to the Gabor energy branch.
    pub gabor_axis: String,

    /// Volume fed to the 9-tap branch.
    pub tap_axis: String,
}

/// Output parameters for the two reconstructed videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the videos are written into.
    pub dir: PathBuf,

    /// Output frame rate.
    pub fps: u32,

    /// File name of the Gabor energy video.
    pub gabor_name: String,

    /// File name of the 9-tap video.
    pub tap_name: String,

    /// Frames are already 3-channel; skip gray expansion.
    pub color: bool,

    /// Optional path for a JSON run summary.
    pub report: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "stfilter_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_input: PathBuf::from("pen.mp4"),
            pipeline: PipelineDefaults::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            gabor_axis: "y".to_string(),
            tap_axis: "y".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            fps: 24,
            gabor_name: "gabor-energy-x-t.avi".to_string(),
            tap_name: "9-Tap-x-t.avi".to_string(),
            color: false,
            report: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location.
    ///
    /// A missing file yields the defaults. A file that cannot be read or
    /// parsed is an error; callers decide whether to fall back.
    pub fn load() -> StfilterResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, with the same rules as [`AppConfig::load`].
    pub fn load_from(path: &Path) -> StfilterResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            StfilterError::config(format!("Failed to read config at {}: {e}", path.display()))
        })?;
        Self::from_json(&content).map_err(|e| {
            StfilterError::config(format!("Failed to parse config at {}: {e}", path.display()))
        })
    }

    /// Parse a config document. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("stfilter").join("config.json")
}
