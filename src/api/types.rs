//! Wire types for the anomaly API.

use serde::{Deserialize, Serialize};

use crate::anomaly_detection::DetectionResult;

/// JSON body returned by every detection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResponse {
    pub anomaly: bool,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl From<DetectionResult> for AnomalyResponse {
    fn from(result: DetectionResult) -> Self {
        Self {
            anomaly: result.anomaly,
            score: result.score,
            reasons: result.reasons,
        }
    }
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
