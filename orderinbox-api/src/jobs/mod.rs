pub mod budget_monitor;

pub use budget_monitor::BudgetMonitor;
