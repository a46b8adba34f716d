use crate::database::AsyncDbConnection;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;
use shared_types::{BudgetConfig, Source};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Load a user's budget config. A missing row is the valid "no budget set"
/// state, not an error.
pub async fn load(conn: AsyncDbConnection, user_id: &str) -> Result<Option<BudgetConfig>> {
    let conn = conn.lock().await;

    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT budget_limit, tracked_sources FROM budget_configs WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((limit_str, sources_json)) = row else {
        return Ok(None);
    };

    let budget_limit = Decimal::from_str(&limit_str)
        .with_context(|| format!("Stored budget limit is not a decimal: {limit_str}"))?;
    let tracked_sources: BTreeSet<Source> = serde_json::from_str(&sources_json)
        .with_context(|| "Stored tracked_sources is not valid JSON")?;

    Ok(Some(BudgetConfig {
        user_id: user_id.to_string(),
        budget_limit,
        tracked_sources,
    }))
}

/// Save a user's budget config, replacing the whole record in one
/// statement so concurrent updates never interleave partial fields.
pub async fn save(conn: AsyncDbConnection, config: &BudgetConfig) -> Result<()> {
    let conn = conn.lock().await;
    let now = chrono::Utc::now().timestamp();
    let sources_json = serde_json::to_string(&config.tracked_sources)?;

    conn.execute(
        "INSERT INTO budget_configs (user_id, budget_limit, tracked_sources, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            budget_limit = excluded.budget_limit,
            tracked_sources = excluded.tracked_sources,
            last_alert_month = NULL,
            last_alert_at = NULL,
            updated_at = excluded.updated_at",
        params![
            &config.user_id,
            config.budget_limit.to_string(),
            sources_json,
            now
        ],
    )?;

    Ok(())
}

/// True when an alert already went out for this user in `year_month`.
pub async fn was_alerted(conn: AsyncDbConnection, user_id: &str, year_month: &str) -> Result<bool> {
    let conn = conn.lock().await;
    let stored: Option<Option<String>> = conn
        .query_row(
            "SELECT last_alert_month FROM budget_configs WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(stored.flatten().as_deref() == Some(year_month))
}

/// Record that an alert went out for `year_month`.
pub async fn mark_alerted(conn: AsyncDbConnection, user_id: &str, year_month: &str) -> Result<()> {
    let conn = conn.lock().await;
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "UPDATE budget_configs SET last_alert_month = ?2, last_alert_at = ?3 WHERE user_id = ?1",
        params![user_id, year_month, now],
    )?;
    Ok(())
}
