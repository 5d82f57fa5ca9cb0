use nb_core::{ArticleRepository, OutboundMessage, SubscriberRegistry};
use std::sync::Arc;
use tracing::{error, info};
use crate::command::{Command, InboundCommand};
use crate::messages;

/// Number of articles listed by `/articles`
pub const ARTICLE_LIST_LIMIT: usize = 5;

/// Maps each inbound command to exactly one reply. Store errors are logged
/// and turned into a generic message.
#[derive(Clone)]
pub struct CommandRouter {
    articles: Arc<dyn ArticleRepository>,
    subscribers: Arc<dyn SubscriberRegistry>,
}

impl CommandRouter {
    pub fn new(articles: Arc<dyn ArticleRepository>, subscribers: Arc<dyn SubscriberRegistry>) -> Self {
        Self {
            articles,
            subscribers,
        }
    }

    pub async fn handle(&self, event: &InboundCommand) -> OutboundMessage {
        match event.command {
            Command::Start => self.start(&event.chat_id).await,
            Command::Articles => self.list_articles().await,
            Command::Random => self.random_article().await,
        }
    }

    async fn start(&self, chat_id: &str) -> OutboundMessage {
        match self.subscribers.upsert(chat_id).await {
            Ok(()) => {
                info!("👋 Chat {} subscribed", chat_id);
                OutboundMessage::plain(messages::WELCOME)
            }
            Err(e) => {
                error!("Failed to register chat {}: {}", chat_id, e);
                OutboundMessage::plain(messages::REGISTER_FAILED)
            }
        }
    }

    async fn list_articles(&self) -> OutboundMessage {
        match self.articles.first_n(ARTICLE_LIST_LIMIT).await {
            Ok(articles) if articles.is_empty() => OutboundMessage::plain(messages::NO_ARTICLES_SAVED),
            Ok(articles) => messages::article_list(&articles),
            Err(e) => {
                error!("Failed to list articles: {}", e);
                OutboundMessage::plain(messages::ARTICLES_FAILED)
            }
        }
    }

    async fn random_article(&self) -> OutboundMessage {
        match self.articles.random_one().await {
            Ok(Some(article)) => messages::article(&article),
            Ok(None) => OutboundMessage::plain(messages::NO_ARTICLES),
            Err(e) => {
                error!("Failed to fetch a random article: {}", e);
                OutboundMessage::plain(messages::RANDOM_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::test_utils::UnavailableStore;
    use nb_core::{Article, ParseMode};
    use nb_storage::InMemoryStorage;

    fn router(storage: &Arc<InMemoryStorage>) -> CommandRouter {
        CommandRouter::new(storage.clone(), storage.clone())
    }

    fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| Article::new(format!("Title {}", i), format!("https://example.com/{}", i), "d"))
            .collect()
    }

    #[tokio::test]
    async fn test_start_registers_once() {
        let storage = Arc::new(InMemoryStorage::new());
        let router = router(&storage);
        let event = InboundCommand::new("7", Command::Start);

        assert_eq!(router.handle(&event).await.text, messages::WELCOME);
        assert_eq!(router.handle(&event).await.text, messages::WELCOME);

        let subscribers = storage.list_all().await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].chat_id, "7");
    }

    #[tokio::test]
    async fn test_articles_on_empty_store() {
        let storage = Arc::new(InMemoryStorage::new());
        let reply = router(&storage)
            .handle(&InboundCommand::new("7", Command::Articles))
            .await;
        assert_eq!(reply.text, messages::NO_ARTICLES_SAVED);
    }

    #[tokio::test]
    async fn test_articles_lists_first_five() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.insert_batch(&articles(8)).await.unwrap();

        let reply = router(&storage)
            .handle(&InboundCommand::new("7", Command::Articles))
            .await;

        assert_eq!(reply.parse_mode, ParseMode::MarkdownV2);
        assert!(reply.text.starts_with("1\\. [Title 1](https://example.com/1)\nd\n"));
        assert!(reply.text.contains("5\\. [Title 5](https://example.com/5)"));
        assert!(!reply.text.contains("Title 6"));
    }

    #[tokio::test]
    async fn test_random() {
        let storage = Arc::new(InMemoryStorage::new());
        let router = router(&storage);
        let event = InboundCommand::new("7", Command::Random);

        assert_eq!(router.handle(&event).await.text, messages::NO_ARTICLES);

        storage.insert_batch(&articles(1)).await.unwrap();
        assert_eq!(
            router.handle(&event).await.text,
            "Title 1\nhttps://example.com/1\nd"
        );
    }

    #[tokio::test]
    async fn test_store_errors_become_generic_replies() {
        let store = Arc::new(UnavailableStore);
        let router = CommandRouter::new(store.clone(), store);

        let reply = |command| {
            let router = router.clone();
            async move { router.handle(&InboundCommand::new("7", command)).await.text }
        };

        assert_eq!(reply(Command::Start).await, messages::REGISTER_FAILED);
        assert_eq!(reply(Command::Articles).await, messages::ARTICLES_FAILED);
        assert_eq!(reply(Command::Random).await, messages::RANDOM_FAILED);
    }
}
