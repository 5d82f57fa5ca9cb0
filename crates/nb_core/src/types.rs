use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated article. The `link` is the natural key used for dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
        }
    }
}

/// An unvalidated record as produced by a scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
}

impl RawCandidate {
    pub fn new(title: impl Into<String>, link: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.map(str::to_string),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub chat_id: String,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            subscribed_at: Utc::now(),
        }
    }
}

/// How the transport should interpret the text of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Plain,
    MarkdownV2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::MarkdownV2,
        }
    }
}
