use crate::source::Source;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized purchase record extracted from a single email.
///
/// Built by the order normalizer and read-only afterwards. The amount is
/// always non-negative; refund/cancellation messages never become orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Derived from the message id of the email this order came from.
    pub order_id: String,
    pub source: Source,
    pub amount: Decimal,
    pub order_date: NaiveDate,
    pub subject: String,
    pub sender: String,
    /// Short body excerpt shown in the expense list.
    pub preview: String,
}

impl Order {
    /// Grouping key for monthly aggregation, e.g. "2026-08".
    pub fn year_month(&self) -> String {
        self.order_date.format("%Y-%m").to_string()
    }
}
