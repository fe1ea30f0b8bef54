use crate::error::RunnerError;
use core_types::{RawResult, ScenarioConfig};
use serde_json::{Map, Value};
use uuid::Uuid;

/// How one scenario settled.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Succeeded(RawResult),
    /// Human-readable reason, taken from the client error.
    Failed(String),
}

/// One settled scenario, at its position in the submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub index: usize,
    pub config: ScenarioConfig,
    pub outcome: ItemOutcome,
}

/// Everything a batch run produced, in submission order.
///
/// When `cancelled` is set, `items` holds only the scenarios that settled
/// before cancellation and `submitted` is larger than `items.len()`.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub submitted: usize,
    pub items: Vec<BatchItem>,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn successes(&self) -> impl Iterator<Item = (&ScenarioConfig, &RawResult)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Succeeded(data) => Some((&item.config, data)),
            ItemOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ScenarioConfig, &str)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Failed(reason) => Some((&item.config, reason.as_str())),
            ItemOutcome::Succeeded(_) => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Fails with the user-facing batch error when nothing succeeded.
    pub fn ensure_any_success(&self) -> Result<(), RunnerError> {
        if self.success_count() == 0 {
            return Err(RunnerError::AllFailed {
                attempted: self.items.len(),
            });
        }
        Ok(())
    }

    /// Wraps each successful payload as a result record,
    /// `{"name" | "symbol": <series label>, "result": <payload>}`, ready for
    /// validation.
    pub fn records(&self) -> Vec<Value> {
        self.successes()
            .map(|(config, data)| {
                let mut record = Map::new();
                record.insert(
                    config.mode().label_field().to_string(),
                    Value::String(config.series_label().to_string()),
                );
                record.insert("result".to_string(), data.clone());
                Value::Object(record)
            })
            .collect()
    }
}
