use serde::Deserialize;
use serde_json::Value;

/// The envelope every simulation endpoint wraps its payload in.
///
/// `{"success": true, "message": "Calculated Probability Result", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Absent or `null` on failure.
    #[serde(default)]
    pub data: Option<Value>,
}
