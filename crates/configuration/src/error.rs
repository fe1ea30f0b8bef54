use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Failed to read scenario file {}: {source}", .path.display())]
    ScenarioFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario file: {0}")]
    ScenarioParse(#[from] toml::de::Error),

    #[error("Invalid scenario '{label}': {source}")]
    InvalidScenario {
        label: String,
        #[source]
        source: CoreError,
    },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
