//! Error types for the detection engine.

use thiserror::Error;

/// Errors surfaced by the detection engine.
///
/// Data-quality problems (malformed timestamps, missing optional fields) are
/// absorbed by documented defaults and never appear here; only infrastructure
/// failure does.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The statistical backend's model artifact is missing or unreadable.
    /// Recoverable at the service boundary; callers map it to a 503.
    #[error("detection model unavailable: {0}")]
    ModelUnavailable(String),

    /// A request was rejected before reaching any detector.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DetectionError {
    /// Whether the condition is a temporary service-side outage rather than a
    /// caller mistake.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;
