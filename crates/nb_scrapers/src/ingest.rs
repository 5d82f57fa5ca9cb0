use nb_core::{
    validate_candidates, Article, ArticleRepository, BatchCache, RawCandidate, Result, Scraper,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns scraped candidates into articles, keeps the latest batch in memory
/// and appends it to the repository.
pub struct ScrapeIngestor {
    scraper: Arc<dyn Scraper>,
    repository: Arc<dyn ArticleRepository>,
    batch: Arc<BatchCache>,
}

impl ScrapeIngestor {
    pub fn new(
        scraper: Arc<dyn Scraper>,
        repository: Arc<dyn ArticleRepository>,
        batch: Arc<BatchCache>,
    ) -> Self {
        Self {
            scraper,
            repository,
            batch,
        }
    }

    pub fn batch(&self) -> &Arc<BatchCache> {
        &self.batch
    }

    pub async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        self.scraper.fetch_candidates().await
    }

    /// Validates and dedups `candidates`, then swaps them in as the current batch.
    async fn stage(&self, candidates: Vec<RawCandidate>) -> Vec<Article> {
        let total = candidates.len();
        let report = validate_candidates(candidates);
        if report.invalid > 0 || report.duplicates > 0 {
            warn!(
                "⚠️ Dropped {} invalid and {} duplicate candidates out of {}",
                report.invalid, report.duplicates, total
            );
        }
        info!(
            "📰 {} articles in the current batch from {}",
            report.articles.len(),
            self.scraper.source()
        );

        self.batch.replace(report.articles.clone()).await;
        report.articles
    }

    /// Validates, swaps the current batch and appends it to the repository.
    /// Returns the articles the repository actually inserted.
    pub async fn ingest(&self, candidates: Vec<RawCandidate>) -> Result<Vec<Article>> {
        let articles = self.stage(candidates).await;
        self.persist(&articles).await
    }

    /// Fetches the listing and makes it the current batch, without persisting it.
    pub async fn scrape(&self) -> Result<Vec<Article>> {
        let candidates = self.fetch_candidates().await?;
        Ok(self.stage(candidates).await)
    }

    /// Fetches the listing and ingests it.
    pub async fn refresh(&self) -> Result<Vec<Article>> {
        let candidates = self.fetch_candidates().await?;
        self.ingest(candidates).await
    }

    /// Persists the current batch.
    pub async fn save_current(&self) -> Result<Vec<Article>> {
        let batch = self.batch.snapshot().await;
        self.persist(&batch).await
    }

    pub async fn random_current(&self) -> Option<Article> {
        self.batch.random().await
    }

    async fn persist(&self, articles: &[Article]) -> Result<Vec<Article>> {
        let inserted = self.repository.insert_batch(articles).await?;
        info!(
            "💾 Saved {} new articles ({} already stored)",
            inserted.len(),
            articles.len() - inserted.len()
        );
        Ok(inserted)
    }
}
