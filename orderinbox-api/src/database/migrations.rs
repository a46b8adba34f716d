use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    // One flat record per user: limit plus tracked sources, replaced whole
    // on every save. Amounts are stored as decimal strings.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS budget_configs (
            user_id VARCHAR PRIMARY KEY,
            budget_limit VARCHAR NOT NULL,
            tracked_sources VARCHAR NOT NULL,
            last_alert_month VARCHAR,
            last_alert_at BIGINT,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    Ok(())
}
