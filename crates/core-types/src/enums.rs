use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle intervals accepted by the simulation service.
pub const VALID_TIMEFRAMES: [&str; 8] = ["1m", "5m", "15m", "1h", "4h", "1d", "1w", "1M"];

/// The kind of computation a scenario asks the simulation service for.
///
/// Each mode has its own endpoint, its own result schema and its own key in
/// the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioMode {
    PortfolioBacktest,
    MonteCarlo,
    Probability,
}

impl ScenarioMode {
    pub const ALL: [ScenarioMode; 3] = [
        ScenarioMode::PortfolioBacktest,
        ScenarioMode::MonteCarlo,
        ScenarioMode::Probability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioMode::PortfolioBacktest => "portfolio-backtest",
            ScenarioMode::MonteCarlo => "monte-carlo",
            ScenarioMode::Probability => "probability",
        }
    }

    /// Path of the endpoint on the simulation service, relative to its base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ScenarioMode::PortfolioBacktest => "/backtest/portfolio",
            ScenarioMode::MonteCarlo => "/backtest/monte-carlo",
            ScenarioMode::Probability => "/backtest/probability",
        }
    }

    /// Key under which validated results of this mode are persisted between
    /// the `run` and `show` steps.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ScenarioMode::PortfolioBacktest => "portfolioTestResults",
            ScenarioMode::MonteCarlo => "monteCarloResults",
            ScenarioMode::Probability => "probabilityResults",
        }
    }

    /// The record field that carries the series label.
    pub fn label_field(&self) -> &'static str {
        match self {
            ScenarioMode::PortfolioBacktest => "name",
            ScenarioMode::MonteCarlo | ScenarioMode::Probability => "symbol",
        }
    }
}

impl fmt::Display for ScenarioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| CoreError::UnknownMode(s.to_string()))
    }
}
