use crate::enums::ScenarioMode;
use crate::series::NamedSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of a portfolio backtest. `roi` and `cagr` arrive pre-formatted by
/// the service (e.g. `"12.34%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBacktest {
    pub final_balance: f64,
    pub roi: String,
    pub mdd: f64,
    pub cagr: String,
    pub portfolio_value_history: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub name: String,
    pub result: PortfolioBacktest,
}

/// Distribution summary of a Monte-Carlo price simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloEstimate {
    pub predicted_price: f64,
    /// Percentage (0-100) of simulated paths that ended above the target.
    pub probability_above_target: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub final_prices: Vec<f64>,
}

impl MonteCarloEstimate {
    /// More than half of the simulated paths finished above the target.
    pub fn is_likely(&self) -> bool {
        self.probability_above_target > 50.0
    }

    /// Reference price for the histogram: the first simulated final price
    /// grown by `target_return`.
    pub fn target_price(&self, target_return: f64) -> Option<f64> {
        self.final_prices.first().map(|p| p * (1.0 + target_return))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloRecord {
    pub symbol: String,
    pub result: MonteCarloEstimate,
}

/// Probability of reaching a target return, with the history it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub expected_return: f64,
    pub standard_deviation: f64,
    pub target_return: f64,
    pub z_score: f64,
    /// Fraction in [0, 1].
    pub probability: f64,
    pub value_history: BTreeMap<String, f64>,
    pub daily_returns: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRecord {
    pub symbol: String,
    pub result: ProbabilityEstimate,
}

/// A result record that passed validation. Every field the result views need
/// is present and correctly typed.
///
/// Serializes untagged, i.e. exactly as the `{name|symbol, result}` record it
/// was validated from, so the stored form can be validated again on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidatedResult {
    Portfolio(PortfolioRecord),
    MonteCarlo(MonteCarloRecord),
    Probability(ProbabilityRecord),
}

impl ValidatedResult {
    pub fn mode(&self) -> ScenarioMode {
        match self {
            ValidatedResult::Portfolio(_) => ScenarioMode::PortfolioBacktest,
            ValidatedResult::MonteCarlo(_) => ScenarioMode::MonteCarlo,
            ValidatedResult::Probability(_) => ScenarioMode::Probability,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ValidatedResult::Portfolio(r) => &r.name,
            ValidatedResult::MonteCarlo(r) => &r.symbol,
            ValidatedResult::Probability(r) => &r.symbol,
        }
    }

    /// The date-keyed value history of this result, named after its label.
    /// Monte-Carlo results carry no history.
    pub fn named_series(&self) -> Option<NamedSeries> {
        match self {
            ValidatedResult::Portfolio(r) => Some(NamedSeries::new(
                r.name.clone(),
                r.result.portfolio_value_history.clone(),
            )),
            ValidatedResult::Probability(r) => Some(NamedSeries::new(
                r.symbol.clone(),
                r.result.value_history.clone(),
            )),
            ValidatedResult::MonteCarlo(_) => None,
        }
    }

    /// Ordered `(caption, value)` lines of the summary card for this result.
    pub fn card(&self) -> Vec<(&'static str, String)> {
        match self {
            ValidatedResult::Portfolio(r) => vec![
                ("Final Balance", format!("${:.2}", r.result.final_balance)),
                ("ROI", r.result.roi.clone()),
                ("Max Drawdown", format!("{}%", r.result.mdd)),
                ("CAGR", r.result.cagr.clone()),
            ],
            ValidatedResult::MonteCarlo(r) => vec![
                ("Predicted Price", format!("${:.2}", r.result.predicted_price)),
                (
                    "Probability Above Target",
                    format!("{:.2}%", r.result.probability_above_target),
                ),
                ("Min Price", format!("${:.2}", r.result.min_price)),
                ("Max Price", format!("${:.2}", r.result.max_price)),
                (
                    "Outlook",
                    if r.result.is_likely() { "Likely" } else { "Unlikely" }.to_string(),
                ),
            ],
            ValidatedResult::Probability(r) => vec![
                ("Expected Return", format!("{:.2}%", r.result.expected_return * 100.0)),
                ("Standard Deviation", format!("{:.2}%", r.result.standard_deviation * 100.0)),
                ("Target Return", format!("{:.2}%", r.result.target_return * 100.0)),
                ("Z-Score", format!("{:.2}", r.result.z_score)),
                ("Probability", format!("{:.2}%", r.result.probability * 100.0)),
            ],
        }
    }
}
