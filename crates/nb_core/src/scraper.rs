use async_trait::async_trait;
use std::collections::HashSet;
use crate::types::{Article, RawCandidate};
use crate::Result;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name of the news source
    fn source(&self) -> &str;

    /// Fetches the listing page and returns every candidate found on it.
    /// Fails with `Error::Fetch` when the page cannot be retrieved.
    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>>;
}

/// Outcome of turning a batch of candidates into articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub articles: Vec<Article>,
    /// Candidates dropped for an empty title or a missing link
    pub invalid: usize,
    /// Candidates dropped because an earlier one had the same link
    pub duplicates: usize,
}

/// Validates and dedups a batch. The first occurrence of a link wins.
pub fn validate_candidates(candidates: Vec<RawCandidate>) -> IngestReport {
    let mut report = IngestReport::default();
    let mut seen = HashSet::new();

    for candidate in candidates {
        let title = candidate.title.trim();
        let link = candidate
            .link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty());

        let Some(link) = link.filter(|_| !title.is_empty()) else {
            report.invalid += 1;
            continue;
        };

        if !seen.insert(link.to_string()) {
            report.duplicates += 1;
            continue;
        }

        report
            .articles
            .push(Article::new(title, link, candidate.description.trim()));
    }

    report
}
