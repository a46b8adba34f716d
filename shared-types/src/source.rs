use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognized merchant sources. Closed set: adding a merchant means adding a
/// classifier signature plus an extraction rule table for it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Swiggy,
    Zomato,
    AmazonAuto,
    Dominos,
    BookMyShow,
    Unknown,
}

impl Source {
    /// Every recognized source, in declaration order. `Unknown` excluded.
    pub const KNOWN: [Source; 5] = [
        Source::Swiggy,
        Source::Zomato,
        Source::AmazonAuto,
        Source::Dominos,
        Source::BookMyShow,
    ];

    pub fn is_known(&self) -> bool {
        !matches!(self, Source::Unknown)
    }

    /// Display label matching the original UI naming.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Swiggy => "Swiggy",
            Source::Zomato => "Zomato",
            Source::AmazonAuto => "Amazon Auto",
            Source::Dominos => "Domino's",
            Source::BookMyShow => "BookMyShow",
            Source::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "swiggy" => Ok(Source::Swiggy),
            "zomato" => Ok(Source::Zomato),
            "amazon" | "amazon auto" | "amazon-auto" => Ok(Source::AmazonAuto),
            "domino's" | "dominos" => Ok(Source::Dominos),
            "bookmyshow" | "book my show" => Ok(Source::BookMyShow),
            _ => Err(UnknownSourceError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized source: {0}")]
pub struct UnknownSourceError(pub String);
