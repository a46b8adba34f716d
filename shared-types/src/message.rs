use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw message as yielded by the mailbox client. Immutable input to the
/// extraction pipeline; lives for a single extraction pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// RFC 5322 Message-ID, angle brackets stripped.
    pub message_id: String,
    pub sender: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    /// IMAP internal date of the message.
    pub received_at: DateTime<Utc>,
}

/// First non-empty line of a reduced body, used as the expense-list
/// preview. Callers pass the same text the extraction rules ran over, so
/// HTML-only messages still get a readable preview.
pub fn preview_line(body: &str) -> String {
    let line = body.lines().find(|l| !l.trim().is_empty());
    let line = line.unwrap_or("").trim();
    if line.chars().count() > 120 {
        let cut: String = line.chars().take(120).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
