use crate::amount::Extraction;
use rust_decimal::Decimal;
use shared_types::{preview_line, DateRange, Order, RawMessage, Source};

/// Assembles the canonical order record from classifier and extractor
/// output. `body` is the reduced text the matching stages ran over, which
/// also yields the preview. Returns `None` unless every gate passes:
/// known source, not a refund, extraction succeeded, non-negative amount,
/// date inside the requested range. Callers aggregate only over produced
/// orders, so a `None` is a silent skip rather than an error.
pub fn normalize(
    message: &RawMessage,
    body: &str,
    source: Source,
    is_excluded: bool,
    extraction: Option<&Extraction>,
    range: &DateRange,
) -> Option<Order> {
    if !source.is_known() || is_excluded {
        return None;
    }
    let extraction = extraction?;
    if extraction.amount < Decimal::ZERO {
        return None;
    }

    // Explicit in-body date wins; otherwise the message's received time.
    let order_date = extraction
        .order_date
        .unwrap_or_else(|| message.received_at.date_naive());
    if !range.contains_date(order_date) {
        return None;
    }

    Some(Order {
        order_id: order_id_from(&message.message_id),
        source,
        amount: extraction.amount,
        order_date,
        subject: message.subject.clone(),
        sender: message.sender.clone(),
        preview: preview_line(body),
    })
}

fn order_id_from(message_id: &str) -> String {
    message_id.trim_matches(|c| c == '<' || c == '>').to_string()
}
