use async_trait::async_trait;
use nb_core::{Article, ArticleRepository, Result, Subscriber, SubscriberRegistry};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    links: HashSet<String>,
    subscribers: HashMap<String, Subscriber>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_batch(&mut self, articles: &[Article]) -> Vec<Article> {
        let mut inserted = Vec::new();
        for article in articles {
            if self.links.insert(article.link.clone()) {
                self.articles.push(article.clone());
                inserted.push(article.clone());
            }
        }
        inserted
    }

    pub fn article_at(&self, offset: u64) -> Option<Article> {
        usize::try_from(offset)
            .ok()
            .and_then(|offset| self.articles.get(offset))
            .cloned()
    }

    pub fn first_n(&self, limit: usize) -> Vec<Article> {
        self.articles.iter().take(limit).cloned().collect()
    }

    pub fn upsert(&mut self, chat_id: &str) {
        self.subscribers
            .entry(chat_id.to_string())
            .or_insert_with(|| Subscriber::new(chat_id));
    }
}

/// Process-local storage. Each batch is inserted under a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryStorage {
    async fn insert_batch(&self, articles: &[Article]) -> Result<Vec<Article>> {
        let mut store = self.store.write().await;
        Ok(store.insert_batch(articles))
    }

    async fn count(&self) -> Result<u64> {
        let store = self.store.read().await;
        Ok(store.articles.len() as u64)
    }

    async fn article_at(&self, offset: u64) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.article_at(offset))
    }

    async fn first_n(&self, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.first_n(limit))
    }
}

#[async_trait]
impl SubscriberRegistry for InMemoryStorage {
    async fn upsert(&self, chat_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.upsert(chat_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>> {
        let store = self.store.read().await;
        Ok(store.subscribers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn article(n: usize) -> Article {
        Article::new(
            format!("Article {}", n),
            format!("https://example.com/{}", n),
            format!("Description {}", n),
        )
    }

    #[tokio::test]
    async fn test_insert_and_read_back_in_order() {
        let storage = InMemoryStorage::new();
        let batch: Vec<_> = (0..7).map(article).collect();

        let inserted = storage.insert_batch(&batch).await.unwrap();
        assert_eq!(inserted.len(), 7);
        assert_eq!(storage.count().await.unwrap(), 7);

        let first = storage.first_n(5).await.unwrap();
        assert_eq!(first, batch[..5].to_vec());
        // Deterministic across calls
        assert_eq!(storage.first_n(5).await.unwrap(), first);

        assert_eq!(storage.article_at(6).await.unwrap(), Some(article(6)));
        assert_eq!(storage.article_at(7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_links_are_unique_across_batches() {
        let storage = InMemoryStorage::new();
        storage.insert_batch(&[article(1), article(2)]).await.unwrap();

        let inserted = storage.insert_batch(&[article(2), article(3)]).await.unwrap();
        assert_eq!(inserted, vec![article(3)]);
        assert_eq!(storage.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_random_one_on_empty_store() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.random_one().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_random_one_is_roughly_uniform() {
        let storage = InMemoryStorage::new();
        let batch: Vec<_> = (0..4).map(article).collect();
        storage.insert_batch(&batch).await.unwrap();

        let trials = 4000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let picked = storage.random_one().await.unwrap().unwrap();
            *counts.entry(picked.link).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        // Expected 1000 each; the bounds sit far outside normal variance
        for (link, count) in counts {
            assert!((700..=1300).contains(&count), "{} drawn {} times", link, count);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_a_partial_batch() {
        let storage = InMemoryStorage::new();
        let before: Vec<_> = (0..10).map(article).collect();
        storage.insert_batch(&before).await.unwrap();

        let batch: Vec<_> = (10..5010).map(article).collect();
        let total = 10 + batch.len() as u64;

        let reader = {
            let storage = storage.clone();
            tokio::spawn(async move {
                let mut observed = Vec::new();
                loop {
                    let count = storage.count().await.unwrap();
                    observed.push(count);
                    if count == total {
                        return observed;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        tokio::task::yield_now().await;
        storage.insert_batch(&batch).await.unwrap();

        let observed = reader.await.unwrap();
        assert!(
            observed.iter().all(|count| *count == 10 || *count == total),
            "partial batch observed: {:?}",
            observed.iter().find(|count| **count != 10 && **count != total)
        );
        assert_eq!(storage.first_n(usize::MAX).await.unwrap().len() as u64, total);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let storage = InMemoryStorage::new();
        storage.upsert("42").await.unwrap();
        storage.upsert("42").await.unwrap();
        storage.upsert("43").await.unwrap();

        let subscribers = storage.list_all().await.unwrap();
        assert_eq!(subscribers.len(), 2);
        assert_eq!(subscribers.iter().filter(|s| s.chat_id == "42").count(), 1);
    }
}
