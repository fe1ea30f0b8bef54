use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ApiSettings;
use core_types::{RawResult, ScenarioConfig};
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::ApiEnvelope;

/// The single-item remote invocation the batch runner is built on.
///
/// This trait is the seam between the runner and the network, allowing the
/// underlying implementation (HTTP or a test stub) to be swapped out.
#[async_trait]
pub trait SimulationClient: Send + Sync {
    /// Submits one scenario and returns the `data` payload of a successful
    /// envelope. Transport errors, non-2xx statuses, `success: false` and
    /// malformed envelopes all surface as `ApiError`.
    async fn run_scenario(&self, config: &ScenarioConfig) -> Result<RawResult, ApiError>;
}

/// A `SimulationClient` that talks to the simulation service over HTTP.
#[derive(Clone)]
pub struct HttpSimulationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSimulationClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Market metadata served alongside the simulations.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Symbols the service has data for, optionally restricted to one quote
    /// currency (e.g. `USDT`).
    async fn list_tickers(&self, quote: Option<&str>) -> Result<Vec<String>, ApiError>;
}

impl HttpSimulationClient {
    /// Unwraps the `{success, message, data}` envelope of a response.
    ///
    /// Bodies that are not an envelope become `Status` on an error status and
    /// `Deserialization` otherwise. `success: false` or an error status with
    /// an envelope becomes `Rejected`.
    async fn read_envelope(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        let envelope = match serde_json::from_str::<ApiEnvelope>(&text) {
            Ok(envelope) => envelope,
            // Framework-level errors (404, 422, 500) don't use the envelope.
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }
            Err(e) => {
                return Err(ApiError::Deserialization(format!(
                    "{}. Original text: {}",
                    e, text
                )));
            }
        };

        if !status.is_success() || !envelope.success {
            let message = if envelope.message.is_empty() {
                format!("{} failed with HTTP {}", operation, status.as_u16())
            } else {
                envelope.message
            };
            return Err(ApiError::Rejected(message));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::InvalidData("successful envelope without data".to_string()))
    }
}

#[async_trait]
impl SimulationClient for HttpSimulationClient {
    async fn run_scenario(&self, config: &ScenarioConfig) -> Result<RawResult, ApiError> {
        let url = format!("{}{}", self.base_url, config.mode().endpoint());
        let body = config
            .request_body()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        tracing::debug!(%url, label = %config.label, "Submitting scenario.");

        let response = self.client.post(&url).json(&body).send().await?;
        Self::read_envelope(response, config.mode().as_str()).await
    }
}

#[async_trait]
impl MarketDataClient for HttpSimulationClient {
    async fn list_tickers(&self, quote: Option<&str>) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/market/tickers", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(quote) = quote {
            request = request.query(&[("quote", quote)]);
        }

        tracing::debug!(%url, ?quote, "Fetching ticker list.");

        let response = request.send().await?;
        let data = Self::read_envelope(response, "ticker listing").await?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidData(format!("ticker list is not a list of symbols: {e}")))
    }
}
