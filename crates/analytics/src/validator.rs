use crate::error::Rejection;
use core_types::{
    MonteCarloRecord, PortfolioRecord, ProbabilityRecord, ScenarioMode, ValidatedResult,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Number,
    Text,
    NumberMap,
    NumberList,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Number => "a number",
            FieldKind::Text => "a string",
            FieldKind::NumberMap => "a map of numbers",
            FieldKind::NumberList => "a list of numbers",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Number, Value::Number(_)) => true,
            (FieldKind::Text, Value::String(_)) => true,
            (FieldKind::NumberMap, Value::Object(map)) => map.values().all(Value::is_number),
            (FieldKind::NumberList, Value::Array(items)) => items.iter().all(Value::is_number),
            _ => false,
        }
    }
}

const PORTFOLIO_SCHEMA: &[(&str, FieldKind)] = &[
    ("final_balance", FieldKind::Number),
    ("roi", FieldKind::Text),
    ("mdd", FieldKind::Number),
    ("cagr", FieldKind::Text),
    ("portfolio_value_history", FieldKind::NumberMap),
];

const MONTE_CARLO_SCHEMA: &[(&str, FieldKind)] = &[
    ("predicted_price", FieldKind::Number),
    ("probability_above_target", FieldKind::Number),
    ("min_price", FieldKind::Number),
    ("max_price", FieldKind::Number),
    ("final_prices", FieldKind::NumberList),
];

const PROBABILITY_SCHEMA: &[(&str, FieldKind)] = &[
    ("expected_return", FieldKind::Number),
    ("standard_deviation", FieldKind::Number),
    ("target_return", FieldKind::Number),
    ("z_score", FieldKind::Number),
    ("probability", FieldKind::Number),
    ("value_history", FieldKind::NumberMap),
    ("daily_returns", FieldKind::NumberList),
];

fn schema(mode: ScenarioMode) -> &'static [(&'static str, FieldKind)] {
    match mode {
        ScenarioMode::PortfolioBacktest => PORTFOLIO_SCHEMA,
        ScenarioMode::MonteCarlo => MONTE_CARLO_SCHEMA,
        ScenarioMode::Probability => PROBABILITY_SCHEMA,
    }
}

/// Checks one raw record against the schema of `mode`.
///
/// A record is `{<label>: string, result: {...}}` where the label field is
/// `name` for portfolio backtests and `symbol` otherwise. Extra fields are
/// ignored. Checking is structural only: values are not range-checked.
pub fn validate(mode: ScenarioMode, raw: &Value) -> Result<ValidatedResult, Rejection> {
    let record = raw.as_object().ok_or(Rejection::NotAnObject)?;

    check_label(record, mode.label_field())?;

    let result = record
        .get("result")
        .ok_or_else(|| Rejection::MissingField("result".to_string()))?;
    let result = result.as_object().ok_or_else(|| Rejection::WrongType {
        field: "result".to_string(),
        expected: "an object",
    })?;

    for &(field, kind) in schema(mode) {
        let value = result
            .get(field)
            .ok_or_else(|| Rejection::MissingField(format!("result.{field}")))?;
        if !kind.matches(value) {
            return Err(Rejection::WrongType {
                field: format!("result.{field}"),
                expected: kind.expected(),
            });
        }
    }

    let schema_error = |e: serde_json::Error| Rejection::Schema {
        mode,
        reason: e.to_string(),
    };

    let validated = match mode {
        ScenarioMode::PortfolioBacktest => {
            ValidatedResult::Portfolio(PortfolioRecord::deserialize(raw).map_err(schema_error)?)
        }
        ScenarioMode::MonteCarlo => {
            ValidatedResult::MonteCarlo(MonteCarloRecord::deserialize(raw).map_err(schema_error)?)
        }
        ScenarioMode::Probability => ValidatedResult::Probability(
            ProbabilityRecord::deserialize(raw).map_err(schema_error)?,
        ),
    };

    Ok(validated)
}

fn check_label(record: &Map<String, Value>, field: &str) -> Result<(), Rejection> {
    match record.get(field) {
        Some(Value::String(label)) if !label.trim().is_empty() => Ok(()),
        Some(Value::String(_)) => Err(Rejection::EmptyLabel(field.to_string())),
        Some(_) => Err(Rejection::WrongType {
            field: field.to_string(),
            expected: "a string",
        }),
        None => Err(Rejection::MissingField(field.to_string())),
    }
}

/// Keeps the records of `raws` that pass [`validate`], in their original
/// order. Rejected records are dropped and logged at debug level.
pub fn validate_batch(mode: ScenarioMode, raws: &[Value]) -> Vec<ValidatedResult> {
    raws.iter()
        .enumerate()
        .filter_map(|(index, raw)| match validate(mode, raw) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::debug!(%mode, index, %reason, "Dropping invalid result record.");
                None
            }
        })
        .collect()
}
