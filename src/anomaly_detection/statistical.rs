//! Statistical detection strategy backed by a pre-trained classifier.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::anomaly_detection::errors::Result;
use crate::anomaly_detection::model::{merchant_hash_bucket, ModelArtifactStore, OutlierModel};
use crate::anomaly_detection::time::{Clock, TimestampNormalizer};
use crate::anomaly_detection::{DetectionResult, TransactionRecord};

/// Reason attached when the classifier flags a transaction.
pub const ML_FLAGGED_REASON: &str = "ML model flagged as outlier";

/// Wraps the pre-trained outlier classifier with lazy, once-per-process
/// artifact loading.
///
/// The handle is the only mutable shared state in the engine: it transitions
/// once from unloaded to loaded under the `OnceCell` guard, so racing first
/// calls read the artifact from disk at most once and all observe the same
/// handle. A missing artifact is not an error until this strategy is actually
/// invoked.
pub struct StatisticalDetector {
    model_path: PathBuf,
    model: OnceCell<OutlierModel>,
    normalizer: TimestampNormalizer,
}

impl StatisticalDetector {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            model: OnceCell::new(),
            normalizer: TimestampNormalizer::new(),
        }
    }

    pub fn with_clock(model_path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            model_path,
            model: OnceCell::new(),
            normalizer: TimestampNormalizer::with_clock(clock),
        }
    }

    /// Build a detector around an already-loaded handle, bypassing the disk
    /// load. Lets tests substitute a fake model without process-wide state.
    pub fn preloaded(model: OutlierModel) -> Self {
        Self {
            model_path: PathBuf::new(),
            model: OnceCell::with_value(model),
            normalizer: TimestampNormalizer::new(),
        }
    }

    fn handle(&self) -> Result<&OutlierModel> {
        self.model.get_or_try_init(|| {
            let model = ModelArtifactStore::load(&self.model_path)?;
            info!(path = %self.model_path.display(), "outlier model loaded");
            Ok(model)
        })
    }

    /// Evaluate a transaction against the classifier.
    ///
    /// The model handle is resolved before any feature work so an unavailable
    /// backend surfaces without touching history or computing features.
    /// Feature vector, fixed order: amount, hour of day, international flag
    /// as 0/1, merchant hash bucket.
    pub fn evaluate(&self, tx: &TransactionRecord) -> Result<DetectionResult> {
        let model = self.handle()?;

        let hour = self.normalizer.extract_hour(&tx.timestamp, &tx.meta);
        let features = [
            tx.amount,
            f64::from(hour),
            if tx.is_international { 1.0 } else { 0.0 },
            merchant_hash_bucket(&tx.merchant) as f64,
        ];

        let margin = model.decision_function(&features);
        let flagged = model.is_outlier(&features);
        // Logistic transform squashes the raw margin into (0,1).
        let score = 1.0 / (1.0 + (-margin).exp());

        let reasons = if flagged {
            vec![ML_FLAGGED_REASON.to_string()]
        } else {
            Vec::new()
        };

        Ok(DetectionResult::new(flagged, score, reasons))
    }
}
