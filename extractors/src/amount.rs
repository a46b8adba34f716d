use crate::html::strip_to_text;
use crate::rules::{self, ExtractionRule};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared_types::{RawMessage, Source};
use std::collections::HashMap;
use std::str::FromStr;

/// Successful extraction: the charged amount, the label of the rule that
/// matched, and an explicit in-body order date when one was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub amount: Decimal,
    pub label: &'static str,
    pub order_date: Option<NaiveDate>,
}

/// Pulls a monetary amount and an optional order date out of a message body
/// using the per-source rule tables. Rules run in priority order and the
/// first successful match wins; a message where no rule matches is a miss,
/// not an error.
pub struct AmountExtractor {
    rules: HashMap<Source, Vec<ExtractionRule>>,
    date_rules: Vec<ExtractionRule>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        let mut table = HashMap::new();
        for source in Source::KNOWN {
            table.insert(source, rules::rules_for(source));
        }
        Self {
            rules: table,
            date_rules: rules::date_rules(),
        }
    }

    /// Convenience for a single message: reduce the body, then match.
    pub fn extract(&self, message: &RawMessage, source: Source) -> Option<Extraction> {
        self.extract_from_text(&message_text(message), source)
    }

    /// Runs the source's rule list over an already-reduced body text.
    /// Callers that also run the refund check reduce once and share the
    /// text between both stages.
    pub fn extract_from_text(&self, text: &str, source: Source) -> Option<Extraction> {
        let rules = self.rules.get(&source)?;

        for rule in rules {
            if let Some(caps) = rule.regex.captures(text) {
                let raw = caps.get(1)?.as_str();
                // Unparseable amount strings are treated as no match so a
                // lower-priority rule still gets its chance.
                if let Some(amount) = parse_amount(raw) {
                    return Some(Extraction {
                        amount,
                        label: rule.label,
                        order_date: self.extract_date(text),
                    });
                }
            }
        }

        None
    }

    fn extract_date(&self, text: &str) -> Option<NaiveDate> {
        for rule in &self.date_rules {
            if let Some(caps) = rule.regex.captures(text) {
                if let Some(date) = parse_date(caps.get(1)?.as_str()) {
                    return Some(date);
                }
            }
        }
        None
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a message to the one body text every matching stage runs over:
/// the plain part when present, else the stripped HTML part. The refund
/// check and the amount rules must see the same text, or an HTML-only
/// cancellation could pass the refund gate yet still yield an amount.
pub fn message_text(message: &RawMessage) -> String {
    if !message.body_text.trim().is_empty() {
        message.body_text.clone()
    } else if let Some(html) = &message.body_html {
        strip_to_text(html)
    } else {
        String::new()
    }
}

/// Parse an amount string tolerating thousands separators and stray
/// currency remnants. Returns `None` (no match) on garbage.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.replace('/', "-").replace(' ', "-");
    for format in ["%d-%b-%Y", "%d-%B-%Y", "%Y-%m-%d", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn message(body_text: &str, body_html: Option<&str>) -> RawMessage {
        RawMessage {
            message_id: "test@mail".to_string(),
            sender: "noreply@swiggy.in".to_string(),
            subject: "Order confirmed".to_string(),
            body_text: body_text.to_string(),
            body_html: body_html.map(str::to_string),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_rule_priority_amount_payable_wins_over_order_total() {
        let extractor = AmountExtractor::new();
        let msg = message("Order Total: ₹300\nAmount Payable: ₹250", None);
        let extraction = extractor.extract(&msg, Source::Swiggy).unwrap();
        assert_eq!(extraction.amount, dec!(250));
        assert_eq!(extraction.label, "Amount Payable");
    }

    #[test]
    fn test_parses_thousands_separators() {
        let extractor = AmountExtractor::new();
        let msg = message("Order Total: ₹1,299.50", None);
        let extraction = extractor.extract(&msg, Source::Swiggy).unwrap();
        assert_eq!(extraction.amount, dec!(1299.50));
    }

    #[test]
    fn test_html_body_is_stripped_before_matching() {
        let extractor = AmountExtractor::new();
        let msg = message(
            "",
            Some("<table><tr><td>Amount Paid:</td><td>&#8377;450.00</td></tr></table>"),
        );
        let extraction = extractor.extract(&msg, Source::Zomato).unwrap();
        assert_eq!(extraction.amount, dec!(450.00));
    }

    #[test]
    fn test_no_rule_match_is_none() {
        let extractor = AmountExtractor::new();
        let msg = message("Thanks for your feedback!", None);
        assert!(extractor.extract(&msg, Source::Swiggy).is_none());
    }

    #[test]
    fn test_unknown_source_extracts_nothing() {
        let extractor = AmountExtractor::new();
        let msg = message("Order Total: ₹300", None);
        assert!(extractor.extract(&msg, Source::Unknown).is_none());
    }

    #[test]
    fn test_in_body_order_date_is_picked_up() {
        let extractor = AmountExtractor::new();
        let msg = message("Order Placed: 12 Mar 2026\nAmount Payable: ₹250", None);
        let extraction = extractor.extract(&msg, Source::Swiggy).unwrap();
        assert_eq!(
            extraction.order_date,
            Some(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap())
        );
    }

    #[test]
    fn test_missing_date_is_none() {
        let extractor = AmountExtractor::new();
        let msg = message("Amount Payable: ₹250", None);
        let extraction = extractor.extract(&msg, Source::Swiggy).unwrap();
        assert_eq!(extraction.order_date, None);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("--"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
    }
}
