use shared_types::{RawMessage, Source};

/// Sender addresses and subject substrings that identify one merchant.
struct SourceSignature {
    source: Source,
    /// Matched against the From address, lowercased substring match. Some
    /// merchants send from several addresses.
    senders: &'static [&'static str],
    /// Fallback matched against sender display name or subject.
    keywords: &'static [&'static str],
}

/// Signature table for every recognized merchant. Order matters: the first
/// matching entry wins, so Swiggy's own domains sit above generic keywords.
const SIGNATURES: &[SourceSignature] = &[
    SourceSignature {
        source: Source::Swiggy,
        senders: &[
            "noreply@swiggy.in",
            "orders@swiggy.in",
            "noreply@orders.swiggy.net",
        ],
        keywords: &["swiggy"],
    },
    SourceSignature {
        source: Source::Zomato,
        senders: &["noreply@zomato.com", "orders@zomato.com"],
        keywords: &["zomato"],
    },
    SourceSignature {
        source: Source::AmazonAuto,
        senders: &["auto-confirm@amazon.in", "order-update@amazon.in"],
        keywords: &["amazon"],
    },
    SourceSignature {
        source: Source::Dominos,
        senders: &["do-not-reply@dominos.co.in", "noreply@dominos.co.in"],
        keywords: &["domino"],
    },
    SourceSignature {
        source: Source::BookMyShow,
        senders: &["tickets@bookmyshow.email", "no-reply@bookmyshow.com"],
        keywords: &["bookmyshow", "book my show"],
    },
];

/// Maps a raw message's sender/subject to a merchant source. Pure function
/// over the fixed signature table; case-insensitive; no match means
/// `Source::Unknown` and the message is dropped before extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceClassifier;

impl SourceClassifier {
    pub fn new() -> Self {
        SourceClassifier
    }

    pub fn classify(&self, message: &RawMessage) -> Source {
        let sender = message.sender.to_lowercase();
        let subject = message.subject.to_lowercase();

        for signature in SIGNATURES {
            if signature.senders.iter().any(|addr| sender.contains(addr)) {
                return signature.source;
            }
            if signature
                .keywords
                .iter()
                .any(|kw| sender.contains(kw) || subject.contains(kw))
            {
                return signature.source;
            }
        }

        Source::Unknown
    }
}
