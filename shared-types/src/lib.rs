use serde::{Deserialize, Serialize};

pub mod budget;
pub mod message;
pub mod order;
pub mod report;
pub mod source;

pub use budget::{BudgetConfig, BudgetState, BudgetStatus, SetBudgetRequest};
pub use message::{preview_line, RawMessage};
pub use order::Order;
pub use report::{
    AnalyzeRequest, DateOption, DateRange, MonthlyAggregate, MonthlyExpenses, SourceTotal,
    SpendReport,
};
pub use source::Source;

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
