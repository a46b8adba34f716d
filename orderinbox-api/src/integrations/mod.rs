pub mod alerts;
pub mod imap_client;

pub use alerts::{AlertDispatcher, LogDispatcher, WebhookDispatcher};
pub use imap_client::{MailboxClient, MailboxError};
