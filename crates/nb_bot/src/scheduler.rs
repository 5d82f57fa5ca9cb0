use futures::future::join_all;
use nb_core::{ArticleRepository, Error, Notifier, OutboundMessage, Result, SubscriberRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use crate::messages;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one notification cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub subscribers: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
enum Payload {
    Fixed(OutboundMessage),
    RandomArticle,
}

/// Everything a single subscriber's dispatch needs, cloned into its task.
#[derive(Clone)]
struct Dispatcher {
    articles: Arc<dyn ArticleRepository>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl Dispatcher {
    async fn dispatch(self, chat_id: String, payload: Payload) -> Result<()> {
        let delivery = async {
            let message = match payload {
                Payload::Fixed(message) => message,
                Payload::RandomArticle => match self.articles.random_one().await? {
                    Some(article) => messages::article(&article),
                    None => OutboundMessage::plain(messages::NO_ARTICLES),
                },
            };
            self.notifier.send(&chat_id, &message).await
        };

        match tokio::time::timeout(self.timeout, delivery).await {
            Ok(result) => result,
            Err(_) => Err(Error::Delivery(format!(
                "Timed out after {:?} notifying chat {}",
                self.timeout, chat_id
            ))),
        }
    }
}

/// Sends every subscriber one random article per tick.
pub struct NotificationScheduler {
    subscribers: Arc<dyn SubscriberRegistry>,
    dispatcher: Dispatcher,
    interval: Duration,
}

impl NotificationScheduler {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        subscribers: Arc<dyn SubscriberRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscribers,
            dispatcher: Dispatcher {
                articles,
                notifier,
                timeout: DEFAULT_DISPATCH_TIMEOUT,
            },
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs ticks forever. A tick that overruns the interval causes the
    /// missed ticks to be skipped, never overlapped.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("⏰ Notifying subscribers every {:?}", self.interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                error!("Notification tick failed: {}", e);
            }
        }
    }

    /// One notification cycle.
    pub async fn tick(&self) -> Result<TickReport> {
        let subscribers = self.subscribers.list_all().await?;
        if subscribers.is_empty() {
            debug!("No users to notify.");
            return Ok(TickReport::default());
        }

        let chat_ids: Vec<String> = subscribers.into_iter().map(|s| s.chat_id).collect();

        let payload = match self.dispatcher.articles.count().await {
            Ok(0) => Payload::Fixed(OutboundMessage::plain(messages::NO_ARTICLES)),
            Ok(_) => Payload::RandomArticle,
            Err(e) => {
                let report = self
                    .fan_out(&chat_ids, Payload::Fixed(OutboundMessage::plain(messages::RANDOM_FAILED)))
                    .await;
                error!(
                    "Failed to count articles, notified {} of {} chats of the error",
                    report.delivered, report.subscribers
                );
                return Err(e);
            }
        };

        let report = self.fan_out(&chat_ids, payload).await;
        info!(
            "📬 Notified {} of {} subscribers ({} failed)",
            report.delivered, report.subscribers, report.failed
        );
        Ok(report)
    }

    /// Dispatches to every chat on its own task and collects each outcome.
    async fn fan_out(&self, chat_ids: &[String], payload: Payload) -> TickReport {
        let handles = chat_ids.iter().map(|chat_id| {
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(dispatcher.dispatch(chat_id.clone(), payload.clone()))
        });
        let results = join_all(handles).await;

        let mut report = TickReport {
            subscribers: chat_ids.len(),
            ..TickReport::default()
        };
        for (chat_id, result) in chat_ids.iter().zip(results) {
            match result {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    error!("Failed to notify chat {}: {}", chat_id, e);
                    report.failed += 1;
                }
                Err(e) => {
                    error!("Dispatch task for chat {} aborted: {}", chat_id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nb_core::test_utils::{RecordingNotifier, UnavailableStore};
    use nb_core::Article;
    use nb_storage::InMemoryStorage;

    async fn storage_with(subscribers: &[&str], articles: usize) -> Arc<InMemoryStorage> {
        let storage = Arc::new(InMemoryStorage::new());
        for chat_id in subscribers {
            storage.upsert(chat_id).await.unwrap();
        }
        let batch: Vec<_> = (0..articles)
            .map(|i| Article::new(format!("Title {}", i), format!("https://example.com/{}", i), "d"))
            .collect();
        storage.insert_batch(&batch).await.unwrap();
        storage
    }

    fn scheduler(storage: &Arc<InMemoryStorage>, notifier: &Arc<RecordingNotifier>) -> NotificationScheduler {
        NotificationScheduler::new(storage.clone(), storage.clone(), notifier.clone())
    }

    #[tokio::test]
    async fn test_tick_without_subscribers_sends_nothing() {
        let storage = storage_with(&[], 3).await;
        let notifier = Arc::new(RecordingNotifier::new());

        let report = scheduler(&storage, &notifier).tick().await.unwrap();

        assert_eq!(report, TickReport::default());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_tick_without_articles_broadcasts_once() {
        let storage = storage_with(&["1", "2", "3"], 0).await;
        let notifier = Arc::new(RecordingNotifier::new());

        let report = scheduler(&storage, &notifier).tick().await.unwrap();

        assert_eq!(report.delivered, 3);
        for chat_id in ["1", "2", "3"] {
            let sent = notifier.sent_to(chat_id);
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].text, messages::NO_ARTICLES);
        }
    }

    #[tokio::test]
    async fn test_tick_sends_one_article_per_subscriber() {
        let storage = storage_with(&["1", "2", "3", "4"], 5).await;
        let notifier = Arc::new(RecordingNotifier::new());

        let report = scheduler(&storage, &notifier).tick().await.unwrap();

        assert_eq!(report, TickReport { subscribers: 4, delivered: 4, failed: 0 });
        let stored = storage.first_n(5).await.unwrap();
        for chat_id in ["1", "2", "3", "4"] {
            let sent = notifier.sent_to(chat_id);
            assert_eq!(sent.len(), 1);
            assert!(stored.iter().any(|a| messages::article(a) == sent[0]));
        }
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_block_others() {
        let storage = storage_with(&["ok-1", "broken", "ok-2"], 2).await;
        let notifier = Arc::new(RecordingNotifier::failing_for(&["broken"]));

        let report = scheduler(&storage, &notifier).tick().await.unwrap();

        assert_eq!(report, TickReport { subscribers: 3, delivered: 2, failed: 1 });
        assert_eq!(notifier.sent_to("ok-1").len(), 1);
        assert_eq!(notifier.sent_to("ok-2").len(), 1);
        assert!(notifier.sent_to("broken").is_empty());
    }

    struct StallingNotifier {
        stalled: String,
        inner: RecordingNotifier,
    }

    #[async_trait]
    impl Notifier for StallingNotifier {
        async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<()> {
            if chat_id == self.stalled {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            self.inner.send(chat_id, message).await
        }
    }

    #[tokio::test]
    async fn test_slow_delivery_times_out() {
        let storage = storage_with(&["slow", "fast"], 1).await;
        let notifier = Arc::new(StallingNotifier {
            stalled: "slow".to_string(),
            inner: RecordingNotifier::new(),
        });

        let report = NotificationScheduler::new(storage.clone(), storage.clone(), notifier.clone())
            .with_dispatch_timeout(Duration::from_millis(50))
            .tick()
            .await
            .unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(notifier.inner.sent_to("fast").len(), 1);
    }

    #[tokio::test]
    async fn test_count_failure_reports_error_to_subscribers() {
        let subscribers = storage_with(&["1", "2"], 0).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let scheduler =
            NotificationScheduler::new(Arc::new(UnavailableStore), subscribers, notifier.clone());

        assert!(matches!(scheduler.tick().await, Err(Error::Persistence(_))));
        for chat_id in ["1", "2"] {
            let sent = notifier.sent_to(chat_id);
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].text, messages::RANDOM_FAILED);
        }
    }

    #[tokio::test]
    async fn test_subscriber_load_failure_is_an_error() {
        let storage = storage_with(&[], 1).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let scheduler = NotificationScheduler::new(storage, Arc::new(UnavailableStore), notifier.clone());

        assert!(scheduler.tick().await.is_err());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_keeps_ticking() {
        let storage = storage_with(&["1"], 1).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let scheduler = scheduler(&storage, &notifier).with_interval(Duration::from_millis(20));
        assert_eq!(scheduler.interval(), Duration::from_millis(20));

        let handle = tokio::spawn(async move { scheduler.run().await });
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();

        assert!(notifier.sent_to("1").len() >= 2);
    }
}
