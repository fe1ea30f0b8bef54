use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach the simulation service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to serialize the request body: {0}")]
    Serialization(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("The simulation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("The simulation service rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}
