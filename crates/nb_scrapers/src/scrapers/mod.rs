pub mod techxplore;

pub use techxplore::TechXploreScraper;

/// Common utilities for scrapers
pub(crate) mod utils {
    use nb_core::{Error, Result};
    use scraper::{ElementRef, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Config(format!("Failed to parse URL {}: {}", url, e)))
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Fetch(format!("Invalid selector {}: {}", css, e)))
    }

    /// Trimmed text of the first descendant of `element` matching `selector`
    pub fn first_text(element: &ElementRef, selector: &Selector) -> Option<String> {
        element
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Resolves an `href` against the page it was found on.
    pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        base.join(href).ok().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use scraper::{Html, Selector};

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_first_text() {
        let html = Html::parse_fragment(
            r#"<div><p class="title">  Test Title </p><p class="title">Other</p></div>"#,
        );
        let root = html.root_element();
        let title = Selector::parse(".title").unwrap();
        let missing = Selector::parse(".missing").unwrap();

        assert_eq!(utils::first_text(&root, &title).as_deref(), Some("Test Title"));
        assert_eq!(utils::first_text(&root, &missing), None);
    }

    #[test]
    fn test_resolve_link() {
        let base = utils::parse_url("https://techxplore.com/computer-sciences-news/page3.html").unwrap();

        assert_eq!(
            utils::resolve_link(&base, "/news/2024-01-ai.html").as_deref(),
            Some("https://techxplore.com/news/2024-01-ai.html")
        );
        assert_eq!(
            utils::resolve_link(&base, "https://other.org/a").as_deref(),
            Some("https://other.org/a")
        );
        assert_eq!(utils::resolve_link(&base, "  "), None);
    }
}
