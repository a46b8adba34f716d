use crate::budget::BudgetState;
use crate::order::Order;
use crate::source::Source;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spend totals for one calendar month. Derived from the order set in
/// scope; recomputing over the same orders yields identical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// "YYYY-MM"
    pub year_month: String,
    pub total_spent: Decimal,
    pub order_count: u32,
    pub per_source_totals: BTreeMap<Source, Decimal>,
}

/// One source's share of the total, for share reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTotal {
    pub source: Source,
    pub amount: Decimal,
}

/// Full analysis output over a date range: overall totals plus the monthly
/// trend series and per-source share series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendReport {
    pub total_spent: Decimal,
    pub average_order: Decimal,
    pub total_orders: u32,
    /// Ascending by year-month.
    pub monthly_series: Vec<MonthlyAggregate>,
    /// Descending by amount.
    pub per_source_series: Vec<SourceTotal>,
    pub orders: Vec<Order>,
}

/// Current-month budget view returned by the monthly-expenses endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpenses {
    pub total_spent: Decimal,
    /// max(budget_limit - total_spent, 0)
    pub remaining: Decimal,
    pub percentage_spent: f64,
    pub state: BudgetState,
    pub expenses: Vec<Order>,
}

/// Query ranges the analysis endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOption {
    Last30Days,
    Last90Days,
    LastYear,
    Year2024,
}

/// Instant range resolved from a `DateOption`. Both endpoints are
/// inclusive at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DateRange {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.since.date_naive() && date <= self.until.date_naive()
    }

    /// The current calendar month up to `now`, used for budget evaluation.
    pub fn current_month(now: DateTime<Utc>) -> Self {
        let first = now
            .date_naive()
            .with_day(1)
            .expect("day 1 is valid for every month");
        let since = Utc
            .from_utc_datetime(&first.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        DateRange { since, until: now }
    }
}

impl DateOption {
    pub fn to_range(self, now: DateTime<Utc>) -> DateRange {
        match self {
            DateOption::Last30Days => DateRange {
                since: now - Duration::days(30),
                until: now,
            },
            DateOption::Last90Days => DateRange {
                since: now - Duration::days(90),
                until: now,
            },
            DateOption::LastYear => DateRange {
                since: now - Duration::days(365),
                until: now,
            },
            DateOption::Year2024 => {
                let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
                let until = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
                DateRange { since, until }
            }
        }
    }
}

/// Request body for the analysis endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub email: String,
    pub password: String,
    pub sources: Vec<String>,
    pub date_option: DateOption,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_2024_is_fixed_calendar_year() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let range = DateOption::Year2024.to_range(now);
        assert!(range.contains_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
        assert!(!range.contains_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }

    #[test]
    fn test_current_month_starts_on_day_one() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let range = DateRange::current_month(now);
        assert!(range.contains_date(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()));
        assert!(!range.contains_date(NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()));
    }
}
