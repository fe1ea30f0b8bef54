use core_types::ScenarioMode;
use thiserror::Error;

/// Why a raw result record was refused by the validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("label field '{0}' is empty")]
    EmptyLabel(String),

    #[error("record does not match the {mode} schema: {reason}")]
    Schema { mode: ScenarioMode, reason: String },
}
