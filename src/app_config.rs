use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::platform;

/// Application configuration module
/// This module handles loading, validating and overriding the settings that
/// drive metadata extraction and subtitle generation.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Location of the metadata extraction tool
    #[serde(default = "platform::default_tool_path")]
    pub tool_path: PathBuf,

    /// Seconds to wait for the tool on one file, 0 disables the limit
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Video file extensions to pick up, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Walk subdirectories as well
    #[serde(default)]
    pub recursive: bool,

    /// Leave videos alone when their sidecar already exists
    #[serde(default)]
    pub skip_existing: bool,

    /// Charset the tool should assume for file names (e.g. "cp1251")
    #[serde(default)]
    pub filename_charset: Option<String>,

    /// Additional arguments passed to the tool before the file name
    #[serde(default)]
    pub extra_tool_args: Vec<String>,

    /// chrono format string for timestamps shown in subtitles
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Spacing between periodic samples in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Emit a zero-length first entry listing the camera settings
    #[serde(default = "default_true")]
    pub camera_info_header: bool,

    /// Metadata groups whose DateTimeOriginal starts a periodic sample
    #[serde(default = "default_periodic_groups")]
    pub periodic_groups: Vec<String>,

    /// Show a progress bar while processing a folder
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    120
}

fn default_extensions() -> Vec<String> {
    ["mts", "m2ts", "mp4", "mov"].iter().map(|e| e.to_string()).collect()
}

fn default_date_format() -> String {
    "%d/%m/%Y %H:%M:%S".to_string()
}

/// Longest accepted sample interval (one hour)
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 3_600_000;

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_periodic_groups() -> Vec<String> {
    vec!["H264".to_string()]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file, or defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.tool_path.as_os_str().is_empty() {
            return Err(anyhow!("Metadata tool path must not be empty"));
        }

        if self.extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err(anyhow!("At least one video file extension is required"));
        }

        if self.sample_interval_ms == 0 || self.sample_interval_ms > MAX_SAMPLE_INTERVAL_MS {
            return Err(anyhow!(
                "Sample interval must be between 1 and {} ms, got {}",
                MAX_SAMPLE_INTERVAL_MS,
                self.sample_interval_ms
            ));
        }

        // chrono reports bad specifiers only when formatting
        let probe = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| anyhow!("Failed to build probe date"))?;
        let mut rendered = String::new();
        if write!(rendered, "{}", probe.format(&self.date_format)).is_err() {
            return Err(anyhow!("Invalid date format: {}", self.date_format));
        }

        Ok(())
    }

    /// Extensions in lowercase, without leading dots
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Parse a comma separated extension list as given on the command line
    pub fn parse_extension_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            tool_path: platform::default_tool_path(),
            tool_timeout_secs: default_tool_timeout_secs(),
            extensions: default_extensions(),
            recursive: false,
            skip_existing: false,
            filename_charset: None,
            extra_tool_args: Vec::new(),
            date_format: default_date_format(),
            sample_interval_ms: default_sample_interval_ms(),
            camera_info_header: true,
            periodic_groups: default_periodic_groups(),
            show_progress: true,
            log_level: LogLevel::default(),
        }
    }
}
