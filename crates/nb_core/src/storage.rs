use async_trait::async_trait;
use rand::Rng;
use crate::types::{Article, Subscriber};
use crate::Result;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Append a batch of articles, skipping links that are already stored.
    /// Readers never observe a partially inserted batch.
    /// Returns the articles that were actually inserted.
    async fn insert_batch(&self, articles: &[Article]) -> Result<Vec<Article>>;

    /// Number of stored articles
    async fn count(&self) -> Result<u64>;

    /// Fetch the article at `offset` in insertion order
    async fn article_at(&self, offset: u64) -> Result<Option<Article>>;

    /// First `limit` articles in insertion order
    async fn first_n(&self, limit: usize) -> Result<Vec<Article>>;

    /// Pick one stored article uniformly at random, or `None` when the store is empty.
    async fn random_one(&self) -> Result<Option<Article>> {
        let count = self.count().await?;
        if count == 0 {
            return Ok(None);
        }
        let offset = rand::thread_rng().gen_range(0..count);
        self.article_at(offset).await
    }
}

#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Register a chat. Registering a known chat is a no-op.
    async fn upsert(&self, chat_id: &str) -> Result<()>;

    /// All registered subscribers, in no particular order
    async fn list_all(&self) -> Result<Vec<Subscriber>>;
}
