use crate::amount::{message_text, AmountExtractor};
use crate::classifier::SourceClassifier;
use crate::normalizer;
use crate::refund::RefundDetector;
use serde::Serialize;
use shared_types::{DateRange, Order, RawMessage};

/// Why a message produced no order. Skips are expected outcomes, not
/// failures; the counts feed pattern-rule tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    UnknownSource,
    RefundOrCancellation,
    NoAmountMatch,
    OutOfRange,
}

/// Per-run skip tally, reported alongside the extracted orders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub processed: usize,
    pub extracted: usize,
    pub unknown_source: usize,
    pub excluded: usize,
    pub unmatched: usize,
    pub out_of_range: usize,
}

impl PipelineStats {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnknownSource => self.unknown_source += 1,
            SkipReason::RefundOrCancellation => self.excluded += 1,
            SkipReason::NoAmountMatch => self.unmatched += 1,
            SkipReason::OutOfRange => self.out_of_range += 1,
        }
    }
}

/// The full per-message path: classify, filter refunds, extract, normalize.
/// Compiled once at startup; each message is independent, so a run is a
/// plain in-order fold with aggregation as the join point.
pub struct MessagePipeline {
    classifier: SourceClassifier,
    refund_detector: RefundDetector,
    extractor: AmountExtractor,
}

impl MessagePipeline {
    pub fn new() -> Self {
        Self {
            classifier: SourceClassifier::new(),
            refund_detector: RefundDetector::new(),
            extractor: AmountExtractor::new(),
        }
    }

    /// Process one message into an order, or say why not.
    pub fn process(&self, message: &RawMessage, range: &DateRange) -> Result<Order, SkipReason> {
        let source = self.classifier.classify(message);
        if !source.is_known() {
            return Err(SkipReason::UnknownSource);
        }

        // One body reduction per message: the refund check and the amount
        // rules must see the same text, or an HTML-only cancellation would
        // pass the refund gate and still yield an amount.
        let text = message_text(message);

        // Refund check runs before extraction for every source; an excluded
        // message never becomes an order even when a rule would match.
        let is_excluded = self.refund_detector.is_excluded(&message.subject, &text);
        if is_excluded {
            return Err(SkipReason::RefundOrCancellation);
        }

        let extraction = self.extractor.extract_from_text(&text, source);
        if extraction.is_none() {
            return Err(SkipReason::NoAmountMatch);
        }

        normalizer::normalize(message, &text, source, is_excluded, extraction.as_ref(), range)
            .ok_or(SkipReason::OutOfRange)
    }

    /// Process a message sequence, collecting orders and the skip tally.
    pub fn run(&self, messages: &[RawMessage], range: &DateRange) -> (Vec<Order>, PipelineStats) {
        let mut orders = Vec::new();
        let mut stats = PipelineStats::default();

        for message in messages {
            stats.processed += 1;
            match self.process(message, range) {
                Ok(order) => {
                    stats.extracted += 1;
                    orders.push(order);
                }
                Err(reason) => stats.record(reason),
            }
        }

        (orders, stats)
    }
}

impl Default for MessagePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn range_march_2026() -> DateRange {
        DateRange {
            since: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            until: Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap(),
        }
    }

    fn message(id: &str, sender: &str, subject: &str, body: &str, day: u32) -> RawMessage {
        RawMessage {
            message_id: id.to_string(),
            sender: sender.to_string(),
            subject: subject.to_string(),
            body_text: body.to_string(),
            body_html: None,
            received_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_refund_exclusion_is_universal_across_sources() {
        let pipeline = MessagePipeline::new();
        let range = range_march_2026();
        // Every known merchant, each with an extractable amount but a
        // cancellation marker; none may produce an order.
        let senders = [
            "noreply@swiggy.in",
            "noreply@zomato.com",
            "auto-confirm@amazon.in",
            "do-not-reply@dominos.co.in",
            "tickets@bookmyshow.email",
        ];
        for sender in senders {
            let msg = message(
                "m1",
                sender,
                "Your order was cancelled",
                "Order Total: ₹300",
                10,
            );
            assert_eq!(
                pipeline.process(&msg, &range),
                Err(SkipReason::RefundOrCancellation),
                "refund not excluded for {sender}"
            );
        }
    }

    #[test]
    fn test_three_message_scenario() {
        let pipeline = MessagePipeline::new();
        let range = range_march_2026();
        let messages = vec![
            // In-range Swiggy order
            message(
                "m1",
                "noreply@swiggy.in",
                "Order confirmed",
                "Amount Payable: ₹300",
                10,
            ),
            // Swiggy cancellation with an extractable amount
            message(
                "m2",
                "noreply@swiggy.in",
                "Order cancelled",
                "Order Total: ₹500",
                11,
            ),
            // Zomato order dated outside the requested range
            {
                let mut m = message(
                    "m3",
                    "noreply@zomato.com",
                    "Order delivered",
                    "Amount Paid: ₹450",
                    12,
                );
                m.received_at = Utc.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap();
                m
            },
        ];

        let (orders, stats) = pipeline.run(&messages, &range);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].amount, dec!(300));
        assert_eq!(stats.extracted, 1);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.out_of_range, 1);
    }

    #[test]
    fn test_html_only_cancellation_is_excluded() {
        let pipeline = MessagePipeline::new();
        let mut msg = message("m1", "noreply@zomato.com", "Update on your order", "", 10);
        // No plain part: the refund words live only in the HTML body.
        msg.body_html = Some(
            "<p>Your order was cancelled. A refund has been initiated.</p>\
             <p>Amount Paid: ₹450</p>"
                .to_string(),
        );
        assert_eq!(
            pipeline.process(&msg, &range_march_2026()),
            Err(SkipReason::RefundOrCancellation)
        );
    }

    #[test]
    fn test_html_only_order_gets_text_preview() {
        let pipeline = MessagePipeline::new();
        let mut msg = message("m1", "noreply@zomato.com", "Order delivered", "", 10);
        msg.body_html =
            Some("<p>Thanks for ordering!</p><p>Amount Paid: ₹450</p>".to_string());
        let order = pipeline.process(&msg, &range_march_2026()).unwrap();
        assert_eq!(order.amount, dec!(450));
        assert_eq!(order.preview, "Thanks for ordering! Amount Paid: ₹450");
    }

    #[test]
    fn test_unknown_sender_is_dropped_before_extraction() {
        let pipeline = MessagePipeline::new();
        let msg = message(
            "m1",
            "billing@some-utility.example.com",
            "Invoice",
            "Total: ₹900",
            10,
        );
        assert_eq!(
            pipeline.process(&msg, &range_march_2026()),
            Err(SkipReason::UnknownSource)
        );
    }

    #[test]
    fn test_known_source_without_amount_counts_as_unmatched() {
        let pipeline = MessagePipeline::new();
        let msg = message(
            "m1",
            "noreply@swiggy.in",
            "Rate your delivery",
            "How was your meal?",
            10,
        );
        let (orders, stats) = pipeline.run(std::slice::from_ref(&msg), &range_march_2026());
        assert!(orders.is_empty());
        assert_eq!(stats.unmatched, 1);
    }
}
