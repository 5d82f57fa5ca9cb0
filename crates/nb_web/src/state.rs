use std::sync::Arc;
use nb_core::ArticleRepository;
use nb_scrapers::ScrapeIngestor;

pub struct AppState {
    pub ingestor: Arc<ScrapeIngestor>,
    pub articles: Arc<dyn ArticleRepository>,
}
