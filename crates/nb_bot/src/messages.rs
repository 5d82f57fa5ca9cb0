use nb_core::{Article, OutboundMessage};

pub const WELCOME: &str =
    "Welcome! Type /articles to get the first 5 articles or /random to get a random article.";
pub const NO_ARTICLES_SAVED: &str = "No articles found. Please scrape and save articles first.";
pub const NO_ARTICLES: &str = "No articles found in the database.";
pub const REGISTER_FAILED: &str = "An error occurred while registering your chat.";
pub const ARTICLES_FAILED: &str = "An error occurred while fetching articles.";
pub const RANDOM_FAILED: &str = "An error occurred while fetching a random article.";

/// Escapes every character Telegram MarkdownV2 reserves in text and link labels.
pub fn escape_markdown(text: &str) -> String {
    escape_with(text, |c| {
        matches!(
            c,
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
                | '|' | '{' | '}' | '.' | '!'
        )
    })
}

/// Inside the `(...)` part of a MarkdownV2 link only `)` and `\` need escaping.
pub fn escape_link(url: &str) -> String {
    escape_with(url, |c| matches!(c, '\\' | ')'))
}

fn escape_with(text: &str, reserved: impl Fn(char) -> bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if reserved(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn article(article: &Article) -> OutboundMessage {
    OutboundMessage::plain(format!(
        "{}\n{}\n{}",
        article.title, article.link, article.description
    ))
}

/// Numbered MarkdownV2 list with each title linking to its article.
pub fn article_list(articles: &[Article]) -> OutboundMessage {
    let text = articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            format!(
                "{}\\. [{}]({})\n{}\n",
                index + 1,
                escape_markdown(&article.title),
                escape_link(&article.link),
                escape_markdown(&article.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    OutboundMessage::markdown(text)
}
