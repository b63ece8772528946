//! User spending-history profiles and the provider seam that supplies them.

use serde::{Deserialize, Serialize};

/// Statistical summary of a user's past transactions, supplied externally.
///
/// Every field is optional from the engine's perspective; each rule that reads
/// one applies a documented default instead of failing on absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserHistoryProfile {
    pub avg_amount: Option<f64>,
    pub median_amount: Option<f64>,
    pub std_amount: Option<f64>,
    pub transactions_today: Option<u32>,
    /// Merchant names previously seen for this user.
    pub merchants: Option<Vec<String>>,
    /// Home country code, e.g. "IN".
    pub country: Option<String>,
    pub timezone_offset_hours: Option<f64>,
}

impl UserHistoryProfile {
    pub const DEFAULT_AVG_AMOUNT: f64 = 500.0;

    /// Average amount, defaulting to 500.0 currency units.
    pub fn avg(&self) -> f64 {
        self.avg_amount.unwrap_or(Self::DEFAULT_AVG_AMOUNT)
    }

    /// Standard deviation, defaulting to max(1.0, 0.6 x average).
    pub fn std_dev(&self) -> f64 {
        self.std_amount.unwrap_or_else(|| (self.avg() * 0.6).max(1.0))
    }

    /// Median amount, defaulting to the average.
    pub fn median(&self) -> f64 {
        self.median_amount.unwrap_or_else(|| self.avg())
    }

    /// Count of transactions made earlier today, defaulting to 0.
    pub fn today_count(&self) -> u32 {
        self.transactions_today.unwrap_or(0)
    }

    /// Whether the merchant has been seen before. An absent merchant list
    /// means nothing is familiar.
    pub fn knows_merchant(&self, merchant: &str) -> bool {
        self.merchants
            .as_deref()
            .is_some_and(|seen| seen.iter().any(|m| m == merchant))
    }
}

/// Supplies a user's historical spending profile.
///
/// Backed by a database in production; the engine treats it as synchronous
/// and side-effect-free.
pub trait UserHistoryProvider: Send + Sync {
    fn get(&self, user_id: &str) -> UserHistoryProfile;
}

/// Fixed profile used until a real history store is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubHistoryProvider;

impl UserHistoryProvider for StubHistoryProvider {
    fn get(&self, _user_id: &str) -> UserHistoryProfile {
        UserHistoryProfile {
            avg_amount: Some(600.0),
            median_amount: Some(350.0),
            std_amount: Some(400.0),
            transactions_today: Some(2),
            merchants: Some(vec![
                "Zomato".to_string(),
                "SBI Card".to_string(),
                "Amazon".to_string(),
            ]),
            country: Some("IN".to_string()),
            timezone_offset_hours: Some(5.5),
        }
    }
}
