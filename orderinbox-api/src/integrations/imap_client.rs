use chrono::{DateTime, Duration, TimeZone, Utc};
use imap::ClientBuilder;
use mail_parser::MessageParser;
use shared_types::{DateRange, RawMessage};

/// Failure reasons surfaced to the caller as-is; the engine never retries
/// internally and never masks these as "zero orders found".
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("mailbox authentication failed: {0}")]
    Auth(String),
    #[error("mailbox connection failed: {0}")]
    Connection(String),
    #[error("mailbox protocol error: {0}")]
    Protocol(String),
}

/// Thin IMAP session wrapper that yields raw message envelopes for a date
/// range. Credentials are held only for the lifetime of the session.
pub struct MailboxClient {
    session: imap::Session<imap::Connection>,
    folder: String,
}

impl MailboxClient {
    pub fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        folder: &str,
    ) -> Result<Self, MailboxError> {
        let client = ClientBuilder::new(host, port)
            .connect()
            .map_err(|e| MailboxError::Connection(e.to_string()))?;

        let session = client
            .login(username, password)
            .map_err(|e| MailboxError::Auth(format!("{e:?}")))?;

        Ok(Self {
            session,
            folder: folder.to_string(),
        })
    }

    /// Fetch every message in the folder whose internal date falls inside
    /// `range`, parsed into `RawMessage` envelopes.
    pub fn fetch_messages(&mut self, range: &DateRange) -> Result<Vec<RawMessage>, MailboxError> {
        self.session
            .select(&self.folder)
            .map_err(|e| MailboxError::Protocol(e.to_string()))?;

        // IMAP SINCE/BEFORE work on whole days; BEFORE is exclusive.
        let since = range.since.format("%d-%b-%Y");
        let before = (range.until + Duration::days(1)).format("%d-%b-%Y");
        let query = format!("SINCE {since} BEFORE {before}");
        tracing::debug!("IMAP SEARCH query: {}", query);

        let uids = self
            .session
            .uid_search(&query)
            .map_err(|e| MailboxError::Protocol(e.to_string()))?;

        let mut messages = Vec::with_capacity(uids.len());
        for uid in uids {
            match self.fetch_message(uid) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => tracing::debug!("Skipping unparseable message uid={}", uid),
                Err(e) => return Err(e),
            }
        }

        Ok(messages)
    }

    fn fetch_message(&mut self, uid: u32) -> Result<Option<RawMessage>, MailboxError> {
        let fetches = self
            .session
            .uid_fetch(uid.to_string(), "(RFC822 INTERNALDATE)")
            .map_err(|e| MailboxError::Protocol(e.to_string()))?;

        let Some(fetch) = fetches.iter().next() else {
            return Ok(None);
        };
        let Some(body) = fetch.body() else {
            return Ok(None);
        };

        let parser = MessageParser::default();
        let Some(parsed) = parser.parse(body) else {
            return Ok(None);
        };

        let subject = parsed.subject().unwrap_or_default().to_string();
        let sender = parsed
            .from()
            .and_then(|addrs| addrs.first())
            .map(|addr| match (addr.name(), addr.address()) {
                (Some(name), Some(address)) => format!("{name} <{address}>"),
                (None, Some(address)) => address.to_string(),
                (Some(name), None) => name.to_string(),
                (None, None) => String::new(),
            })
            .unwrap_or_default();

        let body_text = parsed.body_text(0).map(|s| s.to_string());
        let body_html = parsed.body_html(0).map(|s| s.to_string());

        let received_at = fetch
            .internal_date()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| date_sent(&parsed))
            .unwrap_or_else(Utc::now);

        let message_id = parsed
            .message_id()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("uid-{uid}"));

        Ok(Some(RawMessage {
            message_id,
            sender,
            subject,
            body_text: body_text.unwrap_or_default(),
            body_html,
            received_at,
        }))
    }

    pub fn logout(mut self) {
        if let Err(e) = self.session.logout() {
            tracing::debug!("IMAP logout failed: {}", e);
        }
    }
}

fn date_sent(parsed: &mail_parser::Message) -> Option<DateTime<Utc>> {
    parsed
        .date()
        .and_then(|dt| Utc.timestamp_opt(dt.to_timestamp(), 0).single())
}
