use crate::analysis::AnalysisService;
use crate::database::{budgets, AsyncDbConnection};
use crate::integrations::AlertDispatcher;
use anyhow::Result;
use chrono::Utc;
use shared_types::BudgetState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Background budget watcher. Users register with their session
/// credentials on set-budget; each refresh recomputes the current-month
/// spend from live aggregates, evaluates the budget, and dispatches at
/// most one alert per user per month. Credentials stay process-local;
/// only the alert-sent month is persisted.
pub struct BudgetMonitor {
    db_conn: AsyncDbConnection,
    service: Arc<AnalysisService>,
    dispatcher: Arc<dyn AlertDispatcher>,
    sessions: Mutex<HashMap<String, String>>,
    shutting_down: AtomicBool,
}

impl BudgetMonitor {
    pub fn new(
        db_conn: AsyncDbConnection,
        service: Arc<AnalysisService>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            db_conn,
            service,
            dispatcher,
            sessions: Mutex::new(HashMap::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn register(&self, user_id: &str, password: &str) {
        let mut sessions = self.sessions.lock().expect("sessions mutex poisoned");
        sessions.insert(user_id.to_string(), password.to_string());
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
    }

    fn registered_users(&self) -> Vec<(String, String)> {
        let sessions = self.sessions.lock().expect("sessions mutex poisoned");
        sessions
            .iter()
            .map(|(user, password)| (user.clone(), password.clone()))
            .collect()
    }

    /// One refresh pass over every registered user. Per-user failures are
    /// logged and do not stop the pass.
    pub async fn refresh_all(&self) {
        for (user_id, password) in self.registered_users() {
            if self.is_shutting_down() {
                return;
            }
            if let Err(e) = self.refresh_user(&user_id, &password).await {
                tracing::warn!("Budget refresh failed for {}: {}", user_id, e);
            }
        }
    }

    async fn refresh_user(&self, user_id: &str, password: &str) -> Result<()> {
        let Some(config) = budgets::load(self.db_conn.clone(), user_id).await? else {
            // Budget was never set or was removed; nothing to watch.
            return Ok(());
        };

        let now = Utc::now();
        let (expenses, status) = self
            .service
            .monthly_expenses(user_id, password, &config, now)?;

        tracing::debug!(
            "Budget refresh for {}: spent {} of {} ({:.1}%)",
            user_id,
            expenses.total_spent,
            config.budget_limit,
            status.percentage_used
        );

        if status.state == BudgetState::Ok {
            return Ok(());
        }

        let year_month = now.format("%Y-%m").to_string();
        if budgets::was_alerted(self.db_conn.clone(), user_id, &year_month).await? {
            return Ok(());
        }

        match self.dispatcher.notify(user_id, status.percentage_used).await {
            Ok(()) => {
                budgets::mark_alerted(self.db_conn.clone(), user_id, &year_month).await?;
                tracing::info!(
                    "Budget alert sent to {} at {:.1}%",
                    user_id,
                    status.percentage_used
                );
            }
            Err(e) => {
                // Best effort: leave the flag unset so the next pass retries.
                tracing::warn!("Budget alert dispatch failed for {}: {}", user_id, e);
            }
        }

        Ok(())
    }
}
