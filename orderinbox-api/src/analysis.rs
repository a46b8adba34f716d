use crate::config::ImapConfig;
use crate::integrations::{MailboxClient, MailboxError};
use chrono::{DateTime, Utc};
use extractors::{aggregate, evaluate, MessagePipeline, PipelineStats};
use rust_decimal::Decimal;
use shared_types::{
    BudgetConfig, BudgetStatus, DateRange, MonthlyExpenses, Order, Source, SpendReport,
};
use std::collections::BTreeSet;

/// Orchestrates one user's extraction run: mailbox fetch, per-message
/// pipeline, aggregation. One instance serves all requests — the pipeline
/// is compiled once and every run is independent.
pub struct AnalysisService {
    pipeline: MessagePipeline,
    imap: ImapConfig,
}

impl AnalysisService {
    pub fn new(imap: ImapConfig) -> Self {
        Self {
            pipeline: MessagePipeline::new(),
            imap,
        }
    }

    /// Connect-only credential check used by the login endpoint.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<(), MailboxError> {
        let client = MailboxClient::connect(
            &self.imap.host,
            self.imap.port,
            email,
            password,
            &self.imap.folder,
        )?;
        client.logout();
        Ok(())
    }

    /// Fetch and extract all orders in `range` for one user.
    pub fn fetch_orders(
        &self,
        email: &str,
        password: &str,
        range: &DateRange,
    ) -> Result<(Vec<Order>, PipelineStats), MailboxError> {
        let mut client = MailboxClient::connect(
            &self.imap.host,
            self.imap.port,
            email,
            password,
            &self.imap.folder,
        )?;
        let messages = client.fetch_messages(range)?;
        client.logout();

        let (orders, stats) = self.pipeline.run(&messages, range);
        tracing::info!(
            "Extraction run for {}: {} messages, {} orders, {} unmatched, {} excluded, {} unknown",
            email,
            stats.processed,
            stats.extracted,
            stats.unmatched,
            stats.excluded,
            stats.unknown_source
        );

        Ok((orders, stats))
    }

    /// The analysis query surface: orders over `range`, aggregated over the
    /// selected sources.
    pub fn analyze(
        &self,
        email: &str,
        password: &str,
        sources: &BTreeSet<Source>,
        range: &DateRange,
    ) -> Result<SpendReport, MailboxError> {
        let (orders, _stats) = self.fetch_orders(email, password, range)?;
        Ok(aggregate(&orders, sources))
    }

    /// Current-month budget view for a user with a stored config.
    pub fn monthly_expenses(
        &self,
        email: &str,
        password: &str,
        config: &BudgetConfig,
        now: DateTime<Utc>,
    ) -> Result<(MonthlyExpenses, BudgetStatus), MailboxError> {
        let range = DateRange::current_month(now);
        let (orders, _stats) = self.fetch_orders(email, password, &range)?;
        Ok(build_monthly_expenses(config, &orders))
    }
}

/// Assemble the monthly-expenses view from current-month orders: tracked
/// sources only, `remaining` floored at zero.
pub fn build_monthly_expenses(
    config: &BudgetConfig,
    orders: &[Order],
) -> (MonthlyExpenses, BudgetStatus) {
    let status = evaluate(config, orders);
    let report = aggregate(orders, &config.tracked_sources);

    let remaining = (config.budget_limit - report.total_spent).max(Decimal::ZERO);
    let expenses = MonthlyExpenses {
        total_spent: report.total_spent,
        remaining,
        percentage_spent: status.percentage_used,
        state: status.state,
        expenses: report.orders,
    };

    (expenses, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use shared_types::BudgetState;

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

    fn config(limit: Decimal, sources: &[Source]) -> BudgetConfig {
        BudgetConfig {
            user_id: "user@example.com".to_string(),
            budget_limit: limit,
            tracked_sources: sources.iter().copied().collect(),
        }
    }

    #[test]
    fn test_monthly_expenses_counts_tracked_sources_only() {
        let (expenses, status) = build_monthly_expenses(
            &config(dec!(1000), &[Source::Swiggy]),
            &[
                order(Source::Swiggy, dec!(820)),
                order(Source::Zomato, dec!(900)),
            ],
        );
        assert_eq!(expenses.total_spent, dec!(820));
        assert_eq!(expenses.remaining, dec!(180));
        assert_eq!(status.state, BudgetState::Warning);
        assert_eq!(expenses.expenses.len(), 1);
    }

    #[test]
    fn test_remaining_is_floored_at_zero() {
        let (expenses, status) = build_monthly_expenses(
            &config(dec!(1000), &[Source::Swiggy]),
            &[order(Source::Swiggy, dec!(1050))],
        );
        assert_eq!(expenses.remaining, Decimal::ZERO);
        assert_eq!(status.state, BudgetState::Exceeded);
    }

    #[test]
    fn test_empty_month_is_zero_spend_ok() {
        let (expenses, status) =
            build_monthly_expenses(&config(dec!(1000), &[Source::Swiggy]), &[]);
        assert_eq!(expenses.total_spent, Decimal::ZERO);
        assert_eq!(expenses.remaining, dec!(1000));
        assert_eq!(status.state, BudgetState::Ok);
    }
}
