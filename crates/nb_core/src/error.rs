use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The upstream listing page could not be fetched or parsed.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The store is unavailable or rejected a write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A single message could not be delivered to a chat.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The chat transport failed outside of a single delivery (e.g. polling).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
