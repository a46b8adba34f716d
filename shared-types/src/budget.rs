use crate::source::Source;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-owned spending limit plus the sources it applies to.
///
/// Created on the first set-budget action and overwritten whole (never
/// field-merged) on later updates. Persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub user_id: String,
    pub budget_limit: Decimal,
    pub tracked_sources: BTreeSet<Source>,
}

/// Threshold tier of current spend against the budget limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetState {
    Ok,
    /// Spend crossed 80% of the limit.
    Warning,
    /// Spend crossed 100% of the limit.
    Exceeded,
}

/// Derived evaluation result. Recomputed on every call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub percentage_used: f64,
    pub state: BudgetState,
}

/// Request body for the set-budget endpoint.
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub email: String,
    pub password: String,
    pub sources: Vec<String>,
    pub budget_limit: Decimal,
}
