use async_trait::async_trait;
use nb_core::{Error, RawCandidate, Result, Scraper};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use super::utils;

const ITEM_SELECTOR: &str = ".sorted-article-content.d-flex.flex-column.ie-flex-1";
const TITLE_SELECTOR: &str = ".text-middle.mb-3 a.news-link";
const DESCRIPTION_SELECTOR: &str = ".mb-4";

/// Scrapes the techxplore computer-science news listing.
#[derive(Debug, Clone)]
pub struct TechXploreScraper {
    client: reqwest::Client,
    listing_url: Url,
}

impl TechXploreScraper {
    pub const DEFAULT_LISTING_URL: &'static str =
        "https://techxplore.com/computer-sciences-news/page3.html";

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_listing_url(Self::DEFAULT_LISTING_URL)
    }

    pub fn with_listing_url(listing_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("newsbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            listing_url: utils::parse_url(listing_url)?,
        })
    }

    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }
}

/// Extracts every listing item from the page. Items missing a title or a
/// link are still returned; validation happens at ingest.
pub fn parse_listing(html: &str, base: &Url) -> Result<Vec<RawCandidate>> {
    let document = Html::parse_document(html);
    let item = utils::selector(ITEM_SELECTOR)?;
    let title = utils::selector(TITLE_SELECTOR)?;
    let description = utils::selector(DESCRIPTION_SELECTOR)?;

    let candidates = document
        .select(&item)
        .map(|element| {
            let anchor = element.select(&title).next();
            RawCandidate {
                title: utils::first_text(&element, &title).unwrap_or_default(),
                link: anchor
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| utils::resolve_link(base, href)),
                description: utils::first_text(&element, &description).unwrap_or_default(),
            }
        })
        .collect();

    Ok(candidates)
}

#[async_trait]
impl Scraper for TechXploreScraper {
    fn source(&self) -> &str {
        "techxplore"
    }

    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>> {
        info!("🌐 Fetching {}", self.listing_url);
        let html = self
            .client
            .get(self.listing_url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::Fetch(format!("Failed to fetch {}: {}", self.listing_url, e)))?
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read {}: {}", self.listing_url, e)))?;

        let candidates = parse_listing(&html, &self.listing_url)?;
        debug!("Found {} candidates on {}", candidates.len(), self.listing_url);
        Ok(candidates)
    }
}
