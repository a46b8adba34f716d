use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared_types::{BudgetConfig, BudgetState, BudgetStatus, Order};

/// Percentage of the limit at which the warning tier starts.
pub const WARNING_THRESHOLD: f64 = 80.0;
/// Percentage of the limit at which spend counts as exceeded.
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

/// Evaluate current-month spend against the stored budget.
///
/// Counts only orders from tracked sources; untracked spend affects
/// neither the shown total nor the thresholds. Stateless and side-effect
/// free — recomputed from live aggregates on every call. Whether an alert
/// already went out this month is the caller's bookkeeping.
pub fn evaluate(config: &BudgetConfig, orders: &[Order]) -> BudgetStatus {
    let total_spent: Decimal = orders
        .iter()
        .filter(|o| config.tracked_sources.contains(&o.source))
        .map(|o| o.amount)
        .sum();

    let percentage_used = percentage_of(total_spent, config.budget_limit);
    BudgetStatus {
        percentage_used,
        state: state_for(percentage_used),
    }
}

pub fn percentage_of(spent: Decimal, limit: Decimal) -> f64 {
    if limit <= Decimal::ZERO {
        return 0.0;
    }
    let ratio = spent / limit * Decimal::from(100);
    ratio.to_f64().unwrap_or(0.0)
}

fn state_for(percentage_used: f64) -> BudgetState {
    if percentage_used >= EXCEEDED_THRESHOLD {
        BudgetState::Exceeded
    } else if percentage_used >= WARNING_THRESHOLD {
        BudgetState::Warning
    } else {
        BudgetState::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use shared_types::Source;
    use std::collections::BTreeSet;

    fn config(limit: Decimal, sources: &[Source]) -> BudgetConfig {
        BudgetConfig {
            user_id: "user@example.com".to_string(),
            budget_limit: limit,
            tracked_sources: sources.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    fn order(source: Source, amount: Decimal) -> Order {
        Order {
            order_id: format!("{source}-{amount}"),
            source,
            amount,
            order_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            subject: String::new(),
            sender: String::new(),
            preview: String::new(),
        }
    }

    #[test]
    fn test_under_threshold_is_ok() {
        let status = evaluate(
            &config(dec!(1000), &[Source::Swiggy]),
            &[order(Source::Swiggy, dec!(500))],
        );
        assert_eq!(status.state, BudgetState::Ok);
        assert!((status.percentage_used - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_warning_at_85_percent() {
        let status = evaluate(
            &config(dec!(1000), &[Source::Swiggy]),
            &[order(Source::Swiggy, dec!(850))],
        );
        assert_eq!(status.state, BudgetState::Warning);
        assert!((status.percentage_used - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exceeded_past_100_percent() {
        let status = evaluate(
            &config(dec!(1000), &[Source::Swiggy]),
            &[order(Source::Swiggy, dec!(1050))],
        );
        assert_eq!(status.state, BudgetState::Exceeded);
        assert!((status.percentage_used - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_80_percent_is_warning() {
        let status = evaluate(
            &config(dec!(1000), &[Source::Swiggy]),
            &[order(Source::Swiggy, dec!(800))],
        );
        assert_eq!(status.state, BudgetState::Warning);
    }

    #[test]
    fn test_untracked_sources_are_ignored() {
        // Swiggy-only budget: the Zomato spend affects nothing.
        let status = evaluate(
            &config(dec!(1000), &[Source::Swiggy]),
            &[
                order(Source::Swiggy, dec!(820)),
                order(Source::Zomato, dec!(900)),
            ],
        );
        assert_eq!(status.state, BudgetState::Warning);
        assert!((status.percentage_used - 82.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_orders_is_zero_percent_ok() {
        let status = evaluate(&config(dec!(1000), &[Source::Swiggy]), &[]);
        assert_eq!(status.state, BudgetState::Ok);
        assert_eq!(status.percentage_used, 0.0);
    }
}
