use crate::error::ConfigError;
use core_types::{ScenarioConfig, ScenarioMode, ScenarioParams};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Aligned rows already carry a field with this name.
const RESERVED_LABEL: &str = "date";

/// The on-disk layout of a scenario batch file: a list of `[[scenario]]` tables.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<ScenarioConfig>,
}

/// A set of scenarios that all share one mode, checked and ready to submit.
#[derive(Debug, Clone)]
pub struct ScenarioBatch {
    pub mode: ScenarioMode,
    pub scenarios: Vec<ScenarioConfig>,
}

/// Reads and checks a scenario batch file.
pub fn load_scenarios(path: &Path) -> Result<ScenarioBatch, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ScenarioFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenarios(&content)
}

/// Parses a scenario batch from TOML.
///
/// Percentage allocations are normalized into weights, then every scenario is
/// pre-flight validated. A batch must be non-empty and single-mode, and for
/// modes whose results are aligned on one chart the series labels must be
/// unique, since they become column names.
pub fn parse_scenarios(content: &str) -> Result<ScenarioBatch, ConfigError> {
    let file: ScenarioFile = toml::from_str(content)?;
    let mut scenarios = file.scenarios;

    let Some(mode) = scenarios.first().map(ScenarioConfig::mode) else {
        return Err(ConfigError::ValidationError(
            "scenario file contains no [[scenario]] entries".to_string(),
        ));
    };

    let mut labels = HashSet::new();
    for scenario in &mut scenarios {
        if scenario.mode() != mode {
            return Err(ConfigError::ValidationError(format!(
                "scenario '{}' is {} but the batch is {}; run one mode per batch",
                scenario.label,
                scenario.mode(),
                mode
            )));
        }

        if let ScenarioParams::PortfolioBacktest(params) = &mut scenario.params {
            params
                .normalize_allocation()
                .map_err(|source| ConfigError::InvalidScenario {
                    label: scenario.label.clone(),
                    source,
                })?;
        }

        scenario
            .validate()
            .map_err(|source| ConfigError::InvalidScenario {
                label: scenario.label.clone(),
                source,
            })?;

        let aligned = mode != ScenarioMode::MonteCarlo;
        if aligned && scenario.series_label() == RESERVED_LABEL {
            return Err(ConfigError::ValidationError(format!(
                "series label '{}' is reserved for the date column",
                RESERVED_LABEL
            )));
        }
        if aligned && !labels.insert(scenario.series_label().to_string()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate series label '{}' in batch",
                scenario.series_label()
            )));
        }
    }

    tracing::debug!(%mode, count = scenarios.len(), "Parsed scenario batch.");
    Ok(ScenarioBatch { mode, scenarios })
}
