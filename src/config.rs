use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{ReportError, Result};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "STORM_REPORT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "storm_report.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub window: WindowConfig,
    pub matching: MatchingConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub cache_dir: PathBuf,
    pub file_name: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub start_year: i32,
    pub end_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    pub tolerance: usize,
    pub unmatched_warn_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub damage_floor: f64,
    pub top_n: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: constants::SOURCE_URL.to_string(),
            cache_dir: PathBuf::from(constants::DEFAULT_CACHE_DIR),
            file_name: constants::SOURCE_FILE_NAME.to_string(),
            timeout_seconds: 600,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_year: constants::DEFAULT_START_YEAR,
            end_year: constants::DEFAULT_END_YEAR,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerance: constants::DEFAULT_MATCH_TOLERANCE,
            unmatched_warn_rate: constants::DEFAULT_UNMATCHED_WARN_RATE,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            damage_floor: constants::DEFAULT_DAMAGE_FLOOR,
            top_n: constants::DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Load configuration from `path`, the `STORM_REPORT_CONFIG` variable, or
    /// `storm_report.toml`, in that order. A missing default file yields defaults;
    /// a missing explicitly named file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.start_year > self.window.end_year {
            return Err(ReportError::Config(format!(
                "window start_year {} is after end_year {}",
                self.window.start_year, self.window.end_year
            )));
        }
        if self.report.damage_floor.is_nan() || self.report.damage_floor < 0.0 {
            return Err(ReportError::Config(format!(
                "report damage_floor must be non-negative, got {}",
                self.report.damage_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.matching.unmatched_warn_rate) {
            return Err(ReportError::Config(format!(
                "matching unmatched_warn_rate must be within [0, 1], got {}",
                self.matching.unmatched_warn_rate
            )));
        }
        if self.source.file_name.trim().is_empty() {
            return Err(ReportError::Config("source file_name is empty".to_string()));
        }
        Ok(())
    }

    /// Where the cached source artifact lives.
    pub fn source_path(&self) -> PathBuf {
        self.source.cache_dir.join(&self.source.file_name)
    }
}
