//! Pre-trained outlier classifier artifact.
//!
//! The engine only consumes a model; training and saving happen elsewhere.
//! The artifact is a JSON file holding a linear decision function over the
//! four-feature transaction vector plus the label the trainer assigned to
//! outliers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anomaly_detection::errors::{DetectionError, Result};

/// Number of merchant-hash buckets in the feature encoding.
pub const MERCHANT_HASH_BUCKETS: u64 = 1_000;

fn default_outlier_label() -> i8 {
    -1
}

/// Read-only handle to a pre-trained binary outlier classifier.
///
/// `decision_function` returns the signed distance from the separating
/// boundary (negative side = outlier); `predict` collapses that margin to a
/// +1/-1 label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierModel {
    /// One weight per feature: amount, hour, international flag, merchant
    /// hash bucket.
    weights: Vec<f64>,
    bias: f64,
    /// Label the trainer used for outliers.
    #[serde(default = "default_outlier_label")]
    outlier_label: i8,
}

impl OutlierModel {
    pub fn new(weights: Vec<f64>, bias: f64, outlier_label: i8) -> Self {
        Self {
            weights,
            bias,
            outlier_label,
        }
    }

    /// Signed anomaly margin for a feature vector. Extra features beyond the
    /// trained weights are ignored; missing ones contribute nothing.
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// +1 for inliers, -1 for outliers.
    pub fn predict(&self, features: &[f64]) -> i8 {
        if self.decision_function(features) < 0.0 {
            -1
        } else {
            1
        }
    }

    /// Whether the predicted label equals the designated outlier label.
    pub fn is_outlier(&self, features: &[f64]) -> bool {
        self.predict(features) == self.outlier_label
    }
}

/// Loads classifier artifacts from a fixed, configured location.
pub struct ModelArtifactStore;

impl ModelArtifactStore {
    /// Load a pre-trained model from `path`.
    ///
    /// A missing or corrupt artifact is a [`DetectionError::ModelUnavailable`]
    /// condition, kept distinguishable from "classifier says not-anomalous".
    pub fn load(path: &Path) -> Result<OutlierModel> {
        let raw = fs::read_to_string(path).map_err(|e| {
            DetectionError::ModelUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DetectionError::ModelUnavailable(format!("corrupt artifact {}: {e}", path.display()))
        })
    }
}

/// Stable hash of a merchant name, reduced to [0, 1000).
///
/// FNV-1a 64 rather than the standard library hasher so the bucket is
/// reproducible across runs and processes. A coarse categorical proxy for the
/// demo-grade feature encoding, not a production embedding.
pub fn merchant_hash_bucket(merchant: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in merchant.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash % MERCHANT_HASH_BUCKETS
}
