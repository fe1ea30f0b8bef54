use crate::error::RunnerError;
use api_client::SimulationClient;
use core_types::ScenarioConfig;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

pub mod cancel;
pub mod error;
pub mod outcome;

pub use cancel::CancelHandle;
pub use outcome::{BatchItem, BatchOutcome, ItemOutcome};

/// Drives a list of scenarios through a `SimulationClient`, one at a time.
///
/// Calls are strictly sequential in submission order, so at most one is in
/// flight. A failing scenario is recorded and the batch moves on; nothing is
/// retried.
#[derive(Default)]
pub struct BatchSimulationRunner {
    cancel: CancelHandle,
    progress_style: Option<ProgressStyle>,
}

impl BatchSimulationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a progress bar on stderr while the batch runs.
    pub fn with_progress_bar(mut self) -> Result<Self, RunnerError> {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-");
        self.progress_style = Some(style);
        Ok(self)
    }

    /// A handle that stops this runner's batch when fired.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs every scenario and reports how each one settled.
    ///
    /// If cancelled, no further scenarios are submitted and an in-flight call
    /// is abandoned; its response, if any, is discarded.
    pub async fn run(
        &self,
        configs: Vec<ScenarioConfig>,
        client: &dyn SimulationClient,
    ) -> BatchOutcome {
        let batch_id = Uuid::new_v4();
        let submitted = configs.len();
        let progress = match &self.progress_style {
            Some(style) => ProgressBar::new(submitted as u64).with_style(style.clone()),
            None => ProgressBar::hidden(),
        };

        tracing::info!(%batch_id, scenarios = submitted, "Starting simulation batch.");

        let mut items = Vec::with_capacity(submitted);
        let mut cancelled = false;

        for (index, config) in configs.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            progress.set_message(config.label.clone());

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!(%batch_id, index, label = %config.label, "Abandoning in-flight scenario.");
                    cancelled = true;
                    break;
                }
                result = client.run_scenario(&config) => result,
            };

            let outcome = match result {
                Ok(data) => {
                    tracing::info!(%batch_id, index, label = %config.label, "Scenario succeeded.");
                    ItemOutcome::Succeeded(data)
                }
                Err(e) => {
                    tracing::warn!(%batch_id, index, label = %config.label, error = %e, "Scenario failed.");
                    ItemOutcome::Failed(e.to_string())
                }
            };

            items.push(BatchItem {
                index,
                config,
                outcome,
            });
            progress.inc(1);
        }

        let outcome = BatchOutcome {
            batch_id,
            submitted,
            items,
            cancelled,
        };

        if cancelled {
            progress.abandon_with_message("cancelled");
        } else {
            progress.finish_with_message("done");
        }

        tracing::info!(
            %batch_id,
            succeeded = outcome.success_count(),
            failed = outcome.failure_count(),
            cancelled,
            "Simulation batch finished."
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::ApiError;
    use async_trait::async_trait;
    use core_types::{ProbabilityParams, RawResult, ScenarioParams};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn scenario(symbol: &str) -> ScenarioConfig {
        ScenarioConfig {
            label: format!("{symbol} odds"),
            params: ScenarioParams::Probability(ProbabilityParams {
                symbol: symbol.to_string(),
                timeframe: "1d".to_string(),
                start_date: "2024-01-01".parse().unwrap(),
                end_date: "2024-06-30".parse().unwrap(),
                initial_balance: Decimal::new(5000, 0),
                target_return: Decimal::new(5, 2),
            }),
        }
    }

    /// Answers with the symbol it was asked about, failing for the listed ones.
    /// Optionally fires a cancel handle after a given number of calls.
    #[derive(Default)]
    struct StubClient {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
        cancel_after: Option<(usize, CancelHandle)>,
    }

    #[async_trait]
    impl SimulationClient for StubClient {
        async fn run_scenario(&self, config: &ScenarioConfig) -> Result<RawResult, ApiError> {
            let symbol = config.series_label().to_string();
            let calls = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(symbol.clone());
                calls.len()
            };
            if let Some((after, handle)) = &self.cancel_after {
                if calls == *after {
                    handle.cancel();
                }
            }
            if self.failing.iter().any(|f| *f == symbol) {
                return Err(ApiError::Rejected(format!("no data for {symbol}")));
            }
            Ok(json!({ "symbol": symbol }))
        }
    }

    /// Never answers.
    struct HangingClient;

    #[async_trait]
    impl SimulationClient for HangingClient {
        async fn run_scenario(&self, _config: &ScenarioConfig) -> Result<RawResult, ApiError> {
            std::future::pending().await
        }
    }

    fn batch() -> Vec<ScenarioConfig> {
        vec![scenario("BTC/USDT"), scenario("ETH/USDT"), scenario("SOL/USDT")]
    }

    #[tokio::test]
    async fn middle_failure_does_not_stop_the_batch() {
        let client = StubClient {
            failing: vec!["ETH/USDT"],
            ..Default::default()
        };

        let outcome = BatchSimulationRunner::new().run(batch(), &client).await;

        assert!(!outcome.cancelled);
        assert_eq!(outcome.items.len(), 3);
        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert_eq!(outcome.success_count() + outcome.failure_count(), outcome.submitted);

        let (failed, reason) = outcome.failures().next().unwrap();
        assert_eq!(failed.series_label(), "ETH/USDT");
        assert!(reason.contains("no data for ETH/USDT"));
        assert!(outcome.ensure_any_success().is_ok());
    }

    #[tokio::test]
    async fn submits_sequentially_and_preserves_order() {
        let client = StubClient::default();

        let outcome = BatchSimulationRunner::new().run(batch(), &client).await;

        let expected = vec!["BTC/USDT", "ETH/USDT", "SOL/USDT"];
        assert_eq!(*client.calls.lock().unwrap(), expected);
        let indices: Vec<usize> = outcome.items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let labels: Vec<&str> = outcome.successes().map(|(c, _)| c.series_label()).collect();
        assert_eq!(labels, expected);
    }

    #[tokio::test]
    async fn records_carry_the_series_label() {
        let client = StubClient {
            failing: vec!["BTC/USDT"],
            ..Default::default()
        };

        let outcome = BatchSimulationRunner::new().run(batch(), &client).await;

        assert_eq!(
            outcome.records(),
            vec![
                json!({ "symbol": "ETH/USDT", "result": { "symbol": "ETH/USDT" } }),
                json!({ "symbol": "SOL/USDT", "result": { "symbol": "SOL/USDT" } }),
            ]
        );
    }

    #[tokio::test]
    async fn all_failures_is_a_batch_error() {
        let client = StubClient {
            failing: vec!["BTC/USDT", "ETH/USDT", "SOL/USDT"],
            ..Default::default()
        };

        let outcome = BatchSimulationRunner::new().run(batch(), &client).await;

        let err = outcome.ensure_any_success().unwrap_err();
        assert!(matches!(err, RunnerError::AllFailed { attempted: 3 }));
        assert_eq!(err.to_string(), "Failed to run simulation. Please try again.");
    }

    #[tokio::test]
    async fn empty_batch_is_a_batch_error() {
        let outcome = BatchSimulationRunner::new()
            .run(Vec::new(), &StubClient::default())
            .await;

        assert!(outcome.items.is_empty());
        assert!(outcome.ensure_any_success().is_err());
    }

    #[tokio::test]
    async fn cancellation_stops_further_submissions() {
        let runner = BatchSimulationRunner::new();
        let client = StubClient {
            cancel_after: Some((1, runner.cancel_handle())),
            ..Default::default()
        };

        let outcome = runner.run(batch(), &client).await;

        assert!(outcome.cancelled);
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(*client.calls.lock().unwrap(), vec!["BTC/USDT"]);
    }

    #[tokio::test]
    async fn cancellation_abandons_the_in_flight_call() {
        let runner = BatchSimulationRunner::new();
        let handle = runner.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            runner.run(batch(), &HangingClient),
        )
        .await
        .expect("cancelled batch should return");

        assert!(outcome.cancelled);
        assert!(outcome.items.is_empty());
    }

    #[tokio::test]
    async fn progress_bar_style_is_valid() {
        let runner = BatchSimulationRunner::new().with_progress_bar().unwrap();
        let outcome = runner.run(batch(), &StubClient::default()).await;
        assert_eq!(outcome.success_count(), 3);
    }
}
