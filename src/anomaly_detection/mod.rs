//! Transaction anomaly detection engine.
//!
//! Interchangeable detection strategies over a normalized transaction record
//! and a user's historical spending profile:
//!
//! - [`RuleBasedDetector`]: deterministic, explainable threshold rules
//! - [`StatisticalDetector`]: pre-trained outlier classifier with a
//!   decision-margin score
//! - [`DemoDetector`]: pseudo-random stand-in, demo only
//!
//! [`DetectionService`] is the facade the HTTP layer talks to; it resolves
//! the caller's history profile and returns the uniform
//! `{anomaly, score, reasons}` contract unchanged.

pub mod demo;
pub mod errors;
pub mod history;
pub mod masking;
pub mod model;
pub mod rules;
pub mod service;
pub mod statistical;
pub mod time;

pub use demo::DemoDetector;
pub use errors::{DetectionError, Result};
pub use history::{StubHistoryProvider, UserHistoryProfile, UserHistoryProvider};
pub use masking::mask_personal_data;
pub use model::{merchant_hash_bucket, ModelArtifactStore, OutlierModel};
pub use rules::RuleBasedDetector;
pub use service::{DetectionService, Detector, DetectorKind};
pub use statistical::StatisticalDetector;
pub use time::{Clock, FixedClock, SystemClock, TimestampNormalizer};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_currency() -> String {
    "INR".to_string()
}

/// A single financial transaction as submitted for evaluation.
///
/// Immutable value; detectors never mutate it. Optional fields carry serde
/// defaults so sparse upstream payloads deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque user identifier.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Positive decimal amount, currency-agnostic for scoring.
    pub amount: f64,
    /// ISO-8601 timestamp; may be malformed or empty.
    #[serde(default)]
    pub timestamp: String,
    /// Merchant name, free text.
    pub merchant: String,
    #[serde(default)]
    pub merchant_category: String,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Open-ended metadata; only consulted as a fallback source for derived
    /// fields such as hour-of-day.
    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

/// Verdict produced by a detector: constructed once per request, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub anomaly: bool,
    /// Severity in [0,1]; clamped on construction.
    pub score: f64,
    /// Human-readable justifications in fixed rule-evaluation order, at most
    /// one per rule.
    pub reasons: Vec<String>,
}

impl DetectionResult {
    pub fn new(anomaly: bool, score: f64, reasons: Vec<String>) -> Self {
        Self {
            anomaly,
            score: score.clamp(0.0, 1.0),
            reasons,
        }
    }

    /// A clean verdict with no triggered reasons.
    pub fn normal() -> Self {
        Self::new(false, 0.0, Vec::new())
    }
}
