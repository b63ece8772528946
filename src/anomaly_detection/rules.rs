//! Deterministic rule-based anomaly scoring.
//!
//! Seven independent threshold checks evaluated in a fixed order; the order
//! defines the `reasons` sequence callers and any explanation UI observe, so
//! it must not be rearranged.

use std::sync::Arc;

use crate::anomaly_detection::history::UserHistoryProfile;
use crate::anomaly_detection::time::{Clock, TimestampNormalizer};
use crate::anomaly_detection::{DetectionResult, TransactionRecord};

/// Absolute amount ceiling, currency-unit agnostic.
const VERY_LARGE_AMOUNT: f64 = 20_000.0;
/// Multiple of the user's median above which an amount is atypical.
const MEDIAN_MULTIPLE: f64 = 3.0;
/// Standard deviations above the mean tolerated before flagging.
const STD_DEV_MULTIPLE: f64 = 3.0;
/// Hours before which a transaction counts as unusually early.
const EARLIEST_USUAL_HOUR: u32 = 6;
/// Minimum amount for the international high-value rule.
const INTERNATIONAL_AMOUNT: f64 = 1_000.0;
/// Same-day transaction count above which frequency is flagged.
const MAX_DAILY_TRANSACTIONS: u32 = 10;
/// Reason count at which the severity score saturates.
const SCORE_SATURATION: f64 = 5.0;

/// Deterministic, explainable scorer combining independent rule checks into a
/// verdict, a count-based score, and ordered reason strings.
#[derive(Clone, Default)]
pub struct RuleBasedDetector {
    normalizer: TimestampNormalizer,
}

impl RuleBasedDetector {
    pub fn new() -> Self {
        Self {
            normalizer: TimestampNormalizer::new(),
        }
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            normalizer: TimestampNormalizer::with_clock(clock),
        }
    }

    /// Evaluate every rule in order, collecting zero or one reason each.
    ///
    /// `anomaly` is true when any rule fired; `score = min(1, n/5)` is a
    /// linear severity proxy over the reason count, deliberately not a
    /// calibrated probability. Pure: neither input is mutated.
    pub fn evaluate(
        &self,
        tx: &TransactionRecord,
        history: &UserHistoryProfile,
    ) -> DetectionResult {
        let mut reasons = Vec::new();

        let avg = history.avg();
        let std_dev = history.std_dev();
        let median = history.median();
        let hour = self.normalizer.extract_hour(&tx.timestamp, &tx.meta);

        if tx.amount > VERY_LARGE_AMOUNT {
            reasons.push("Very large transaction amount".to_string());
        }
        if tx.amount > median * MEDIAN_MULTIPLE {
            reasons.push("High compared to user's typical transaction".to_string());
        }
        if tx.amount > avg + STD_DEV_MULTIPLE * std_dev {
            reasons.push("Amount is far outside typical variance".to_string());
        }
        // hour is always 0-23, so only the early-morning branch can fire.
        if hour < EARLIEST_USUAL_HOUR || hour > 23 {
            reasons.push("Transaction at unusual hour".to_string());
        }
        if !history.knows_merchant(&tx.merchant) {
            reasons.push("Merchant is new/unfamiliar".to_string());
        }
        if tx.is_international && tx.amount > INTERNATIONAL_AMOUNT {
            reasons.push("International high-value transaction".to_string());
        }
        if history.today_count() > MAX_DAILY_TRANSACTIONS {
            reasons.push("Unusually high transaction frequency today".to_string());
        }

        let score = (reasons.len() as f64 / SCORE_SATURATION).min(1.0);
        DetectionResult::new(!reasons.is_empty(), score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly_detection::history::StubHistoryProvider;
    use crate::anomaly_detection::time::FixedClock;
    use crate::anomaly_detection::UserHistoryProvider;

    fn tx(amount: f64, merchant: &str, timestamp: &str, international: bool) -> TransactionRecord {
        TransactionRecord {
            user_id: "u1".to_string(),
            amount,
            timestamp: timestamp.to_string(),
            merchant: merchant.to_string(),
            merchant_category: String::new(),
            is_international: international,
            currency: "INR".to_string(),
            meta: Default::default(),
        }
    }

    fn stub_history() -> UserHistoryProfile {
        StubHistoryProvider.get("u1")
    }

    #[test]
    fn test_quiet_transaction_has_no_reasons() {
        let detector = RuleBasedDetector::new();
        let result = detector.evaluate(
            &tx(400.0, "Zomato", "2024-06-01T12:00:00Z", false),
            &stub_history(),
        );

        assert!(!result.anomaly);
        assert_eq!(result.score, 0.0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_reasons_follow_rule_order() {
        let detector = RuleBasedDetector::new();
        // Triggers rules 1-3 and 5-6 but keeps a daytime hour.
        let result = detector.evaluate(
            &tx(25_000.0, "Unknown Shop", "2024-06-01T12:00:00Z", true),
            &stub_history(),
        );

        assert_eq!(
            result.reasons,
            vec![
                "Very large transaction amount",
                "High compared to user's typical transaction",
                "Amount is far outside typical variance",
                "Merchant is new/unfamiliar",
                "International high-value transaction",
            ]
        );
        assert!(result.anomaly);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_score_is_count_over_five() {
        let detector = RuleBasedDetector::new();
        // Only the unfamiliar-merchant rule fires.
        let result = detector.evaluate(
            &tx(100.0, "New Cafe", "2024-06-01T12:00:00Z", false),
            &stub_history(),
        );
        assert_eq!(result.reasons.len(), 1);
        assert!((result.score - 0.2).abs() < f64::EPSILON);

        // Unfamiliar merchant + international high value.
        let result = detector.evaluate(
            &tx(1_500.0, "New Cafe", "2024-06-01T12:00:00Z", true),
            &stub_history(),
        );
        assert_eq!(result.reasons.len(), 3); // also 3x median (350 * 3 < 1500)
        assert!((result.score - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_early_hour_flagged() {
        let detector = RuleBasedDetector::new();
        let result = detector.evaluate(
            &tx(100.0, "Zomato", "2024-06-01T02:00:00Z", false),
            &stub_history(),
        );
        assert_eq!(result.reasons, vec!["Transaction at unusual hour"]);
    }

    #[test]
    fn test_frequency_rule() {
        let detector = RuleBasedDetector::new();
        let history = UserHistoryProfile {
            transactions_today: Some(11),
            merchants: Some(vec!["Zomato".to_string()]),
            ..stub_history()
        };
        let result = detector.evaluate(
            &tx(100.0, "Zomato", "2024-06-01T12:00:00Z", false),
            &history,
        );
        assert_eq!(
            result.reasons,
            vec!["Unusually high transaction frequency today"]
        );
    }

    #[test]
    fn test_empty_history_uses_defaults() {
        // Defaults: avg 500, std 300, median 500. An 1800-unit purchase
        // clears both 3 x median (1500) and avg + 3 x std (1400).
        let detector = RuleBasedDetector::with_clock(Arc::new(FixedClock(12)));
        let result = detector.evaluate(
            &tx(1_800.0, "Somewhere", "", false),
            &UserHistoryProfile::default(),
        );
        assert_eq!(
            result.reasons,
            vec![
                "High compared to user's typical transaction",
                "Amount is far outside typical variance",
                "Merchant is new/unfamiliar",
            ]
        );

        // Below both derived thresholds only the merchant rule fires.
        let result = detector.evaluate(
            &tx(1_200.0, "Somewhere", "", false),
            &UserHistoryProfile::default(),
        );
        assert_eq!(result.reasons, vec!["Merchant is new/unfamiliar"]);
    }
}
