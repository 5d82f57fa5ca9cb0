use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::types::Article;

/// The result of the most recent scrape, shared between the ingestor and
/// the web handlers. A scrape swaps the whole batch at once; readers get an
/// immutable snapshot.
#[derive(Debug, Default)]
pub struct BatchCache {
    current: RwLock<Arc<Vec<Article>>>,
}

impl BatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, articles: Vec<Article>) {
        let batch = Arc::new(articles);
        *self.current.write().await = batch;
    }

    pub async fn snapshot(&self) -> Arc<Vec<Article>> {
        self.current.read().await.clone()
    }

    pub async fn random(&self) -> Option<Article> {
        let batch = self.snapshot().await;
        batch.choose(&mut rand::thread_rng()).cloned()
    }
}
