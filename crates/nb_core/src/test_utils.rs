//! Test doubles for the collaborator traits, shared by the workspace crates.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use crate::types::{Article, OutboundMessage, RawCandidate, Subscriber};
use crate::{ArticleRepository, Error, Notifier, Result, Scraper, SubscriberRegistry};

/// A scraper that returns a fixed listing, or fails every fetch.
pub struct StaticScraper {
    candidates: Option<Vec<RawCandidate>>,
}

impl StaticScraper {
    pub fn new(candidates: Vec<RawCandidate>) -> Self {
        Self { candidates: Some(candidates) }
    }

    pub fn failing() -> Self {
        Self { candidates: None }
    }
}

#[async_trait]
impl Scraper for StaticScraper {
    fn source(&self) -> &str {
        "static"
    }

    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        self.candidates
            .clone()
            .ok_or_else(|| Error::Fetch("listing page unreachable".to_string()))
    }
}

/// Records every delivery; chats listed in `failing` get a `Delivery` error.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, OutboundMessage)>>,
    failing: HashSet<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(chat_ids: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: chat_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<(String, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: &str) -> Vec<OutboundMessage> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| id == chat_id)
            .map(|(_, message)| message)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<()> {
        if self.failing.contains(chat_id) {
            return Err(Error::Delivery(format!("chat {} is unreachable", chat_id)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), message.clone()));
        Ok(())
    }
}

/// A store whose every operation fails, standing in for an unreachable database.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T> {
    Err(Error::Persistence("store unavailable".to_string()))
}

#[async_trait]
impl ArticleRepository for UnavailableStore {
    async fn insert_batch(&self, _articles: &[Article]) -> Result<Vec<Article>> {
        unavailable()
    }

    async fn count(&self) -> Result<u64> {
        unavailable()
    }

    async fn article_at(&self, _offset: u64) -> Result<Option<Article>> {
        unavailable()
    }

    async fn first_n(&self, _limit: usize) -> Result<Vec<Article>> {
        unavailable()
    }
}

#[async_trait]
impl SubscriberRegistry for UnavailableStore {
    async fn upsert(&self, _chat_id: &str) -> Result<()> {
        unavailable()
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>> {
        unavailable()
    }
}
