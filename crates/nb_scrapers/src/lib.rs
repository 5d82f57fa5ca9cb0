pub mod ingest;
pub mod scrapers;

pub use ingest::ScrapeIngestor;
pub use scrapers::TechXploreScraper;
