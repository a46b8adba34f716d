use regex::Regex;
use shared_types::Source;

/// One amount-extraction rule: a body pattern plus the semantic label of
/// the figure it captures. Capture group 1 is always the amount string.
pub struct ExtractionRule {
    pub label: &'static str,
    pub regex: Regex,
}

impl ExtractionRule {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).expect("extraction rule regex is static"),
        }
    }
}

// Shared amount tail: currency marker (₹ / Rs. / INR), then digits with
// optional thousands separators and decimals.
const AMT: &str = r"(?:₹|Rs\.?|INR)\s*\.?\s*([\d,]+(?:\.\d{1,2})?)";

/// Ordered rule table for one source. The order is load-bearing: a message
/// often carries both a pre-discount figure and the final charge, and only
/// the final charge is spend, so final-charge labels ("Amount Payable",
/// "Paid Via …") sit above the generic totals they would otherwise lose to.
pub fn rules_for(source: Source) -> Vec<ExtractionRule> {
    match source {
        Source::Swiggy => vec![
            ExtractionRule::new("Amount Payable", &format!(r"(?i)Amount Payable\s*:?\s*{AMT}")),
            ExtractionRule::new("Paid Via Bank", &format!(r"(?i)Paid Via Bank\s*:?\s*{AMT}")),
            ExtractionRule::new("Paid Via Cash", &format!(r"(?i)Paid Via Cash\s*:?\s*{AMT}")),
            ExtractionRule::new("Order Total", &format!(r"(?i)Order Total\s*:?\s*{AMT}")),
        ],
        Source::Zomato => vec![
            ExtractionRule::new("Amount Paid", &format!(r"(?i)Amount Paid\s*:?\s*{AMT}")),
            ExtractionRule::new("Grand Total", &format!(r"(?i)Grand Total\s*:?\s*{AMT}")),
            ExtractionRule::new("Order Total", &format!(r"(?i)Order Total\s*:?\s*{AMT}")),
            ExtractionRule::new("Total", &format!(r"(?i)\bTotal\s*:?\s*{AMT}")),
        ],
        Source::AmazonAuto => vec![
            ExtractionRule::new("Order Total", &format!(r"(?i)Order Total\s*:?\s*{AMT}")),
            ExtractionRule::new(
                "Payment Pending",
                &format!(r"(?i)Payment pending\s*:?\s*{AMT}"),
            ),
            ExtractionRule::new("Total", &format!(r"(?i)\bTotal\s*:?\s*{AMT}")),
        ],
        Source::Dominos => vec![
            ExtractionRule::new("Amount Payable", &format!(r"(?i)Amount Payable\s*:?\s*{AMT}")),
            ExtractionRule::new("Grand Total", &format!(r"(?i)Grand Total\s*:?\s*{AMT}")),
            ExtractionRule::new("Total", &format!(r"(?i)\bTotal\s*:?\s*{AMT}")),
        ],
        Source::BookMyShow => vec![
            ExtractionRule::new("Amount Paid", &format!(r"(?i)Amount Paid\s*:?\s*{AMT}")),
            ExtractionRule::new("Total Amount", &format!(r"(?i)Total Amount\s*:?\s*{AMT}")),
            ExtractionRule::new("Total", &format!(r"(?i)\bTotal\s*:?\s*{AMT}")),
        ],
        Source::Unknown => Vec::new(),
    }
}

/// Date strings some merchants embed in the body; group 1 is the date text.
/// Tried in order; when none matches the message's received time is used.
pub fn date_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule::new(
            "Order Date",
            r"(?i)Order (?:Date|Placed(?: On)?)\s*:?\s*(\d{1,2}[ /-][A-Za-z]{3,9}[ /-]\d{4})",
        ),
        ExtractionRule::new(
            "Order Date ISO",
            r"(?i)Order (?:Date|Placed(?: On)?)\s*:?\s*(\d{4}-\d{2}-\d{2})",
        ),
        ExtractionRule::new(
            "Delivery Date",
            r"(?i)Delivered On\s*:?\s*(\d{1,2}[ /-][A-Za-z]{3,9}[ /-]\d{4})",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_source_has_rules() {
        for source in Source::KNOWN {
            assert!(
                !rules_for(source).is_empty(),
                "{source} has no extraction rules"
            );
        }
    }

    #[test]
    fn test_unknown_source_has_no_rules() {
        assert!(rules_for(Source::Unknown).is_empty());
    }

    #[test]
    fn test_swiggy_ranks_amount_payable_before_order_total() {
        let rules = rules_for(Source::Swiggy);
        let payable = rules.iter().position(|r| r.label == "Amount Payable");
        let total = rules.iter().position(|r| r.label == "Order Total");
        assert!(payable.unwrap() < total.unwrap());
    }

    #[test]
    fn test_amount_tail_accepts_currency_variants() {
        let rule = ExtractionRule::new("Total", &format!(r"(?i)Total\s*:?\s*{AMT}"));
        for body in [
            "Total: ₹ 1,299.00",
            "Total: Rs. 450",
            "Total INR 89.50",
            "total ₹250",
        ] {
            assert!(rule.regex.is_match(body), "no match in {body:?}");
        }
    }
}
