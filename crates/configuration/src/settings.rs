use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent `simdeck.toml` is not an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub charts: ChartSettings,
    pub logging: LoggingSettings,
}

/// Where and how to reach the simulation service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout. Monte-Carlo runs on the service side can take a while.
    pub timeout_secs: u64,
}

/// Where validated batch results are kept between `run` and `show`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub directory: PathBuf,
}

/// Presentation parameters for aligned series and histograms.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Decimal places aligned series values are rounded to.
    pub precision: u32,
    pub histogram_buckets: usize,
    /// Decimal places used in histogram bucket labels.
    pub label_precision: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".simdeck"),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            precision: 2,
            histogram_buckets: 20,
            label_precision: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.charts.histogram_buckets == 0 {
            return Err(ConfigError::ValidationError(
                "charts.histogram_buckets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
