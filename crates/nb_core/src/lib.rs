pub mod batch;
pub mod error;
pub mod notifier;
pub mod scraper;
pub mod storage;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use batch::BatchCache;
pub use error::{Error, Result};
pub use notifier::Notifier;
pub use scraper::{validate_candidates, IngestReport, Scraper};
pub use storage::{ArticleRepository, SubscriberRegistry};
pub use types::{Article, OutboundMessage, ParseMode, RawCandidate, Subscriber};
