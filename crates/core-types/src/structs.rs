use crate::enums::{ScenarioMode, VALID_TIMEFRAMES};
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The untyped `data` payload returned by the simulation service for one
/// scenario. Its shape depends on the scenario mode and is only trusted after
/// it has passed the result validator.
pub type RawResult = serde_json::Value;

/// Portfolio weights may drift this far from 1.0 and still be accepted.
const WEIGHT_TOLERANCE: Decimal = dec!(0.000001);

/// One simulation or backtest request, as configured by the user.
///
/// A scenario is immutable once it has been handed to the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Display name of the scenario. For portfolios this becomes the series
    /// name; single-asset modes label their results by symbol.
    pub label: String,
    #[serde(flatten)]
    pub params: ScenarioParams,
}

/// The mode-specific request body. Serializing the inner struct yields exactly
/// the JSON the corresponding endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScenarioParams {
    PortfolioBacktest(PortfolioParams),
    MonteCarlo(MonteCarloParams),
    Probability(ProbabilityParams),
}

/// Parameters for a multi-asset portfolio backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioParams {
    /// Symbol to fractional weight (e.g. `"BTC/USDT" -> 0.5`). Weights sum to 1.
    #[serde(default)]
    pub assets: BTreeMap<String, Decimal>,
    /// Symbol to percentage, as entered on a build screen. Converted into
    /// `assets` by [`PortfolioParams::normalize_allocation`] and never sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_pct: Option<BTreeMap<String, Decimal>>,
    pub initial_balance: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_rebalance_period")]
    pub rebalance_period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_rate: Option<Decimal>,
}

/// Parameters for a single-asset Monte-Carlo price simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloParams {
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_balance: Decimal,
    /// Target return as a fraction (0.1 == 10%).
    pub target_return: Decimal,
    /// Simulation horizon in days.
    pub days: u32,
    #[serde(default = "default_simulations")]
    pub simulations: u32,
}

/// Parameters for a single-asset probability-of-target estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityParams {
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_balance: Decimal,
    pub target_return: Decimal,
}

fn default_rebalance_period() -> String {
    "1M".to_string()
}

fn default_simulations() -> u32 {
    500
}

impl ScenarioConfig {
    pub fn mode(&self) -> ScenarioMode {
        match self.params {
            ScenarioParams::PortfolioBacktest(_) => ScenarioMode::PortfolioBacktest,
            ScenarioParams::MonteCarlo(_) => ScenarioMode::MonteCarlo,
            ScenarioParams::Probability(_) => ScenarioMode::Probability,
        }
    }

    /// The label a successful result of this scenario is stored under:
    /// the portfolio name, or the traded symbol for single-asset modes.
    pub fn series_label(&self) -> &str {
        match &self.params {
            ScenarioParams::PortfolioBacktest(_) => &self.label,
            ScenarioParams::MonteCarlo(p) => &p.symbol,
            ScenarioParams::Probability(p) => &p.symbol,
        }
    }

    /// The JSON request body for the scenario's endpoint.
    pub fn request_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        match &self.params {
            ScenarioParams::PortfolioBacktest(p) => serde_json::to_value(p),
            ScenarioParams::MonteCarlo(p) => serde_json::to_value(p),
            ScenarioParams::Probability(p) => serde_json::to_value(p),
        }
    }

    /// Pre-flight checks run before a scenario is ever submitted.
    ///
    /// Portfolio allocations given in percent must already have been
    /// normalized into weights.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.label.trim().is_empty() {
            return Err(invalid("label", "must not be empty"));
        }

        match &self.params {
            ScenarioParams::PortfolioBacktest(p) => p.validate(),
            ScenarioParams::MonteCarlo(p) => {
                validate_symbol(&p.symbol)?;
                validate_timeframe(&p.timeframe)?;
                validate_window(p.start_date, p.end_date)?;
                validate_balance(p.initial_balance)?;
                if p.days == 0 {
                    return Err(invalid("days", "must be at least 1"));
                }
                if p.simulations == 0 {
                    return Err(invalid("simulations", "must be at least 1"));
                }
                Ok(())
            }
            ScenarioParams::Probability(p) => {
                validate_symbol(&p.symbol)?;
                validate_timeframe(&p.timeframe)?;
                validate_window(p.start_date, p.end_date)?;
                validate_balance(p.initial_balance)
            }
        }
    }
}

impl PortfolioParams {
    /// Converts a percentage allocation into fractional weights.
    ///
    /// Percentages must total exactly 100. Supplying both `allocation_pct` and
    /// `assets` is rejected as ambiguous.
    pub fn normalize_allocation(&mut self) -> Result<(), CoreError> {
        let Some(allocation) = self.allocation_pct.take() else {
            return Ok(());
        };

        if !self.assets.is_empty() {
            return Err(invalid(
                "allocation_pct",
                "cannot be combined with explicit asset weights",
            ));
        }

        let total: Decimal = allocation.values().copied().sum();
        if total != Decimal::ONE_HUNDRED {
            return Err(invalid(
                "allocation_pct",
                &format!("percentages must total 100, got {}", total),
            ));
        }

        self.assets = allocation
            .into_iter()
            .map(|(symbol, pct)| (symbol, pct / Decimal::ONE_HUNDRED))
            .collect();
        Ok(())
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.allocation_pct.is_some() {
            return Err(invalid("allocation_pct", "must be normalized before submission"));
        }
        if self.assets.is_empty() {
            return Err(invalid("assets", "portfolio needs at least one asset"));
        }
        if let Some((symbol, _)) = self.assets.iter().find(|(_, w)| **w <= Decimal::ZERO) {
            return Err(invalid("assets", &format!("weight for {} must be positive", symbol)));
        }

        let total: Decimal = self.assets.values().copied().sum();
        if (total - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
            return Err(invalid("assets", &format!("weights must sum to 1, got {}", total)));
        }

        for (field, rate) in [("fee_rate", self.fee_rate), ("slippage_rate", self.slippage_rate)] {
            if rate.is_some_and(|r| r < Decimal::ZERO || r >= Decimal::ONE) {
                return Err(invalid(field, "must be in [0, 1)"));
            }
        }

        validate_window(self.start_date, self.end_date)?;
        validate_balance(self.initial_balance)
    }
}

fn invalid(field: &str, reason: &str) -> CoreError {
    CoreError::InvalidInput(field.to_string(), reason.to_string())
}

fn validate_symbol(symbol: &str) -> Result<(), CoreError> {
    if symbol.trim().is_empty() {
        return Err(invalid("symbol", "must not be empty"));
    }
    Ok(())
}

fn validate_timeframe(timeframe: &str) -> Result<(), CoreError> {
    if !VALID_TIMEFRAMES.contains(&timeframe) {
        return Err(invalid(
            "timeframe",
            &format!("{} is not one of {}", timeframe, VALID_TIMEFRAMES.join(", ")),
        ));
    }
    Ok(())
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start >= end {
        return Err(invalid(
            "start_date",
            &format!("{} must be before end_date {}", start, end),
        ));
    }
    Ok(())
}

fn validate_balance(balance: Decimal) -> Result<(), CoreError> {
    if balance <= Decimal::ZERO {
        return Err(invalid("initial_balance", "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn portfolio(assets: &[(&str, Decimal)]) -> ScenarioConfig {
        ScenarioConfig {
            label: "Example Portfolio".to_string(),
            params: ScenarioParams::PortfolioBacktest(PortfolioParams {
                assets: assets.iter().map(|(s, w)| (s.to_string(), *w)).collect(),
                allocation_pct: None,
                initial_balance: dec!(10000),
                start_date: date("2024-01-01"),
                end_date: date("2025-01-31"),
                rebalance_period: default_rebalance_period(),
                fee_rate: None,
                slippage_rate: None,
            }),
        }
    }

    fn monte_carlo() -> ScenarioConfig {
        ScenarioConfig {
            label: "BTC 30d".to_string(),
            params: ScenarioParams::MonteCarlo(MonteCarloParams {
                symbol: "BTC/USDT".to_string(),
                timeframe: "1d".to_string(),
                start_date: date("2024-01-01"),
                end_date: date("2024-12-31"),
                initial_balance: dec!(1000),
                target_return: dec!(0.1),
                days: 30,
                simulations: 500,
            }),
        }
    }

    #[test]
    fn portfolio_request_body_matches_endpoint_contract() {
        let config = portfolio(&[("BTC/USDT", dec!(0.5)), ("ETH/USDT", dec!(0.5))]);
        let body = config.request_body().unwrap();
        assert_eq!(
            body,
            json!({
                "assets": { "BTC/USDT": 0.5, "ETH/USDT": 0.5 },
                "initial_balance": 10000.0,
                "start_date": "2024-01-01",
                "end_date": "2025-01-31",
                "rebalance_period": "1M"
            })
        );
    }

    #[test]
    fn monte_carlo_body_carries_simulation_count() {
        let body = monte_carlo().request_body().unwrap();
        assert_eq!(body["simulations"], json!(500));
        assert_eq!(body["days"], json!(30));
        assert_eq!(body["symbol"], json!("BTC/USDT"));
        assert!(body.get("label").is_none());
    }

    #[test]
    fn series_label_depends_on_mode() {
        assert_eq!(portfolio(&[("BTC/USDT", dec!(1))]).series_label(), "Example Portfolio");
        assert_eq!(monte_carlo().series_label(), "BTC/USDT");
    }

    #[test]
    fn accepts_weights_that_sum_to_one() {
        let config = portfolio(&[
            ("BTC/USDT", dec!(0.5)),
            ("ETH/USDT", dec!(0.3)),
            ("SOL/USDT", dec!(0.2)),
        ]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one() {
        let config = portfolio(&[("BTC/USDT", dec!(0.5)), ("ETH/USDT", dec!(0.3))]);
        assert!(matches!(config.validate(), Err(CoreError::InvalidInput(field, _)) if field == "assets"));
    }

    #[test]
    fn rejects_empty_portfolio_and_blank_label() {
        assert!(portfolio(&[]).validate().is_err());

        let mut config = portfolio(&[("BTC/USDT", dec!(1))]);
        config.label = "   ".to_string();
        assert!(matches!(config.validate(), Err(CoreError::InvalidInput(field, _)) if field == "label"));
    }

    #[test]
    fn rejects_inverted_time_window() {
        let mut config = monte_carlo();
        if let ScenarioParams::MonteCarlo(p) = &mut config.params {
            p.start_date = date("2025-01-01");
        }
        assert!(matches!(config.validate(), Err(CoreError::InvalidInput(field, _)) if field == "start_date"));
    }

    #[test]
    fn rejects_unknown_timeframe() {
        let mut config = monte_carlo();
        if let ScenarioParams::MonteCarlo(p) = &mut config.params {
            p.timeframe = "2d".to_string();
        }
        assert!(matches!(config.validate(), Err(CoreError::InvalidInput(field, _)) if field == "timeframe"));
    }

    #[test]
    fn normalizes_percentage_allocation() {
        let mut config = portfolio(&[]);
        let ScenarioParams::PortfolioBacktest(p) = &mut config.params else {
            unreachable!()
        };
        p.allocation_pct = Some(BTreeMap::from([
            ("BTC/USDT".to_string(), dec!(50)),
            ("ETH/USDT".to_string(), dec!(30)),
            ("SOL/USDT".to_string(), dec!(20)),
        ]));

        p.normalize_allocation().unwrap();

        assert_eq!(p.assets["BTC/USDT"], dec!(0.5));
        assert_eq!(p.assets["SOL/USDT"], dec!(0.2));
        assert!(p.allocation_pct.is_none());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn percentage_allocation_must_total_one_hundred() {
        let mut params = match portfolio(&[]).params {
            ScenarioParams::PortfolioBacktest(p) => p,
            _ => unreachable!(),
        };
        params.allocation_pct = Some(BTreeMap::from([("BTC/USDT".to_string(), dec!(90))]));
        assert!(params.normalize_allocation().is_err());
    }

    #[test]
    fn deserializes_mode_tagged_scenario() {
        let config: ScenarioConfig = serde_json::from_value(json!({
            "label": "BTC odds",
            "mode": "probability",
            "symbol": "BTC/USDT",
            "timeframe": "1d",
            "start_date": "2024-01-01",
            "end_date": "2024-06-30",
            "initial_balance": 5000,
            "target_return": 0.05
        }))
        .unwrap();

        assert_eq!(config.mode(), ScenarioMode::Probability);
        assert_eq!(config.validate(), Ok(()));
    }
}
