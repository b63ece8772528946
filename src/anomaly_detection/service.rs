//! Facade over the detection strategies.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::anomaly_detection::demo::DemoDetector;
use crate::anomaly_detection::errors::Result;
use crate::anomaly_detection::history::{
    StubHistoryProvider, UserHistoryProfile, UserHistoryProvider,
};
use crate::anomaly_detection::masking::mask_personal_data;
use crate::anomaly_detection::rules::RuleBasedDetector;
use crate::anomaly_detection::statistical::StatisticalDetector;
use crate::anomaly_detection::{DetectionResult, TransactionRecord};

/// Capability shared by every detection strategy.
pub trait Detector: Send + Sync {
    fn evaluate(
        &self,
        tx: &TransactionRecord,
        history: &UserHistoryProfile,
    ) -> Result<DetectionResult>;
}

impl Detector for RuleBasedDetector {
    fn evaluate(
        &self,
        tx: &TransactionRecord,
        history: &UserHistoryProfile,
    ) -> Result<DetectionResult> {
        Ok(RuleBasedDetector::evaluate(self, tx, history))
    }
}

impl Detector for StatisticalDetector {
    fn evaluate(
        &self,
        tx: &TransactionRecord,
        _history: &UserHistoryProfile,
    ) -> Result<DetectionResult> {
        StatisticalDetector::evaluate(self, tx)
    }
}

impl Detector for DemoDetector {
    fn evaluate(
        &self,
        tx: &TransactionRecord,
        _history: &UserHistoryProfile,
    ) -> Result<DetectionResult> {
        Ok(DemoDetector::evaluate(self, tx))
    }
}

/// Strategy selector; callers pick one, strategies are never blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    RuleBased,
    Statistical,
    Demo,
}

/// Entry point the HTTP layer talks to.
///
/// Resolves the caller's history profile through the injected provider,
/// dispatches to the selected strategy, and returns the verdict unchanged.
pub struct DetectionService {
    history: Arc<dyn UserHistoryProvider>,
    rule_based: RuleBasedDetector,
    statistical: StatisticalDetector,
    demo: DemoDetector,
}

impl DetectionService {
    /// Service with the stub history provider.
    pub fn new(model_path: PathBuf) -> Self {
        Self::with_provider(model_path, Arc::new(StubHistoryProvider))
    }

    pub fn with_provider(model_path: PathBuf, history: Arc<dyn UserHistoryProvider>) -> Self {
        Self {
            history,
            rule_based: RuleBasedDetector::new(),
            statistical: StatisticalDetector::new(model_path),
            demo: DemoDetector::new(),
        }
    }

    /// Assemble a service from explicitly constructed parts; the seam for
    /// pinned clocks, preloaded models, and seeded RNGs.
    pub fn from_parts(
        history: Arc<dyn UserHistoryProvider>,
        rule_based: RuleBasedDetector,
        statistical: StatisticalDetector,
        demo: DemoDetector,
    ) -> Self {
        Self {
            history,
            rule_based,
            statistical,
            demo,
        }
    }

    /// Dispatch to the strategy named by `kind`.
    pub fn evaluate(&self, kind: DetectorKind, tx: &TransactionRecord) -> Result<DetectionResult> {
        match kind {
            DetectorKind::RuleBased => Ok(self.evaluate_rule_based(tx)),
            DetectorKind::Statistical => self.evaluate_statistical(tx),
            DetectorKind::Demo => Ok(self.evaluate_demo(tx)),
        }
    }

    pub fn evaluate_rule_based(&self, tx: &TransactionRecord) -> DetectionResult {
        let history = self.history.get(&tx.user_id);
        let result = self.rule_based.evaluate(tx, &history);
        self.log_verdict(DetectorKind::RuleBased, tx, &result);
        result
    }

    pub fn evaluate_statistical(&self, tx: &TransactionRecord) -> Result<DetectionResult> {
        let result = self.statistical.evaluate(tx)?;
        self.log_verdict(DetectorKind::Statistical, tx, &result);
        Ok(result)
    }

    pub fn evaluate_demo(&self, tx: &TransactionRecord) -> DetectionResult {
        let result = self.demo.evaluate(tx);
        self.log_verdict(DetectorKind::Demo, tx, &result);
        result
    }

    fn log_verdict(&self, kind: DetectorKind, tx: &TransactionRecord, result: &DetectionResult) {
        if result.anomaly {
            warn!(
                user = %tx.user_id,
                merchant = %mask_personal_data(&tx.merchant),
                score = result.score,
                reasons = result.reasons.len(),
                ?kind,
                "transaction flagged as anomalous"
            );
        } else {
            debug!(user = %tx.user_id, score = result.score, ?kind, "transaction clean");
        }
    }
}
