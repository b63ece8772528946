//! Pseudo-random stand-in strategy.
//!
//! Kept for interface completeness while no real detector is wired up; never
//! part of a production decision path.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::anomaly_detection::{DetectionResult, TransactionRecord};

pub const DEMO_HIGH_REASON: &str = "Simulated high anomaly (demo)";
pub const DEMO_MEDIUM_REASON: &str = "Simulated medium anomaly (demo)";

/// Random verdict generator: 5% high anomaly, 15% medium, 80% clean.
///
/// The RNG is injectable through [`DemoDetector::with_seed`] so tests stay
/// deterministic.
pub struct DemoDetector {
    rng: Mutex<StdRng>,
}

impl DemoDetector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn evaluate(&self, _tx: &TransactionRecord) -> DetectionResult {
        let draw: f64 = self.rng.lock().gen();
        Self::classify(draw)
    }

    /// Map a uniform draw in [0,1) to one of the three fixed verdicts.
    fn classify(draw: f64) -> DetectionResult {
        if draw < 0.05 {
            DetectionResult::new(true, 0.95, vec![DEMO_HIGH_REASON.to_string()])
        } else if draw < 0.20 {
            DetectionResult::new(true, 0.6, vec![DEMO_MEDIUM_REASON.to_string()])
        } else {
            DetectionResult::new(false, 0.05, Vec::new())
        }
    }
}

impl Default for DemoDetector {
    fn default() -> Self {
        Self::new()
    }
}
