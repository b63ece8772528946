//! Redaction of card/account-number-like digit runs from free text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement token for redacted digit runs. Contains no digit run of its
/// own, so masking is idempotent.
pub const MASK_TOKEN: &str = "[MASKED_NUMBER]";

static LONG_DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{8,}").expect("digit-run pattern is valid"));

/// Replace every maximal run of 8 or more consecutive digits with
/// [`MASK_TOKEN`].
///
/// Applied to merchant names and other free text before it is logged or
/// echoed back. Pure function, no state.
pub fn mask_personal_data(text: &str) -> String {
    LONG_DIGIT_RUN.replace_all(text, MASK_TOKEN).into_owned()
}
