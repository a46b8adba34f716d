use regex::Regex;

/// Vocabulary signaling a message must not count as spend. Checked with
/// word boundaries so "creditors" or "voidable" do not trip it.
const REFUND_VOCABULARY: &[&str] = &[
    "refund",
    "refunded",
    "cancelled",
    "canceled",
    "cancellation",
    "returned",
    "credit",
    "credited",
    "reversal",
    "void",
    "failed",
    "declined",
];

/// Flags refund/cancellation messages before amount extraction runs.
///
/// Applies to every source uniformly: an earlier iteration only checked two
/// merchants, which let cancelled orders from the others count as spend.
/// A flagged message never produces an order, whatever the extractor finds.
pub struct RefundDetector {
    vocabulary: Regex,
}

impl RefundDetector {
    pub fn new() -> Self {
        let pattern = format!(r"(?i)\b(?:{})\b", REFUND_VOCABULARY.join("|"));
        Self {
            vocabulary: Regex::new(&pattern).expect("refund vocabulary regex is static"),
        }
    }

    /// True when the subject or reduced body contains any
    /// refund/cancellation word. `body` is the same text the amount rules
    /// run over, so HTML-only messages are checked too.
    pub fn is_excluded(&self, subject: &str, body: &str) -> bool {
        self.vocabulary.is_match(subject) || self.vocabulary.is_match(body)
    }
}

impl Default for RefundDetector {
    fn default() -> Self {
        Self::new()
    }
}
