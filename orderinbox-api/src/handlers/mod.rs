pub mod analysis;
pub mod auth;
pub mod budget;

use crate::integrations::MailboxError;
use actix_web::HttpResponse;
use shared_types::Source;
use std::collections::BTreeSet;

/// Map a mailbox failure to a response without masking the reason: auth
/// failures are 401, connectivity failures 502 — never an empty result.
pub fn mailbox_error_response(error: &MailboxError) -> HttpResponse {
    match error {
        MailboxError::Auth(_) => HttpResponse::Unauthorized().json(serde_json::json!({
            "success": false,
            "message": "Email authentication failed. Check your app password."
        })),
        MailboxError::Connection(_) => HttpResponse::BadGateway().json(serde_json::json!({
            "success": false,
            "message": "Could not reach the mail server."
        })),
        MailboxError::Protocol(e) => HttpResponse::BadGateway().json(serde_json::json!({
            "success": false,
            "message": format!("Mail server error: {e}")
        })),
    }
}

/// Parse the request's source labels into the closed source set. Empty
/// selections and unrecognized labels are input errors.
pub fn parse_sources(labels: &[String]) -> Result<BTreeSet<Source>, String> {
    if labels.is_empty() {
        return Err("At least one source must be selected".to_string());
    }
    let mut sources = BTreeSet::new();
    for label in labels {
        let source: Source = label
            .parse()
            .map_err(|_| format!("Unrecognized source: {label}"))?;
        sources.insert(source);
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_accepts_ui_labels() {
        let sources =
            parse_sources(&["Swiggy".to_string(), "Amazon Auto".to_string()]).unwrap();
        assert!(sources.contains(&Source::Swiggy));
        assert!(sources.contains(&Source::AmazonAuto));
    }

    #[test]
    fn test_parse_sources_rejects_empty_selection() {
        assert!(parse_sources(&[]).is_err());
    }

    #[test]
    fn test_parse_sources_rejects_unknown_label() {
        assert!(parse_sources(&["Flipkart".to_string()]).is_err());
    }
}
