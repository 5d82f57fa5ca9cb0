//! Telegram Bot API transport: `sendMessage` for delivery and `getUpdates`
//! long polling for inbound commands.

use async_trait::async_trait;
use nb_core::{Error, Notifier, OutboundMessage, ParseMode, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use crate::command::InboundCommand;
use crate::router::CommandRouter;

pub const API_URL: &str = "https://api.telegram.org";

/// Seconds the server holds a `getUpdates` call open
const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);
/// Request timeout, longer than a long poll
const REQUEST_TIMEOUT: Duration = Duration::from_secs(POLL_TIMEOUT_SECS + 15);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    pub fn command(&self) -> Option<InboundCommand> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        InboundCommand::parse(message.chat.id.to_string(), text)
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl<'a> SendMessage<'a> {
    fn new(chat_id: &'a str, message: &'a OutboundMessage) -> Self {
        Self {
            chat_id,
            text: &message.text,
            parse_mode: match message.parse_mode {
                ParseMode::Plain => None,
                ParseMode::MarkdownV2 => Some("MarkdownV2"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

pub struct TelegramClient {
    client: reqwest::Client,
    bot_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_url(API_URL, token)
    }

    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Config("Telegram bot token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bot_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    /// Calls a Bot API method. Errors carry no token, since reqwest errors
    /// would otherwise echo the full URL.
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> std::result::Result<T, String> {
        let response: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| format!("{} request failed: {}", method, e.without_url()))?
            .json()
            .await
            .map_err(|e| format!("{} returned an unreadable body: {}", method, e.without_url()))?;

        match response {
            ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
            ApiResponse { description, .. } => Err(format!(
                "{} rejected: {}",
                method,
                description.unwrap_or_else(|| "no description".to_string())
            )),
        }
    }

    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdates {
            offset,
            timeout: POLL_TIMEOUT_SECS,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await.map_err(Error::Transport)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<()> {
        self.call::<_, serde_json::Value>("sendMessage", &SendMessage::new(chat_id, message))
            .await
            .map(|_| ())
            .map_err(|e| Error::Delivery(format!("chat {}: {}", chat_id, e)))
    }
}

/// Polls for commands and answers each on its own task.
pub struct TelegramBot {
    client: Arc<TelegramClient>,
    router: CommandRouter,
}

impl TelegramBot {
    pub fn new(client: Arc<TelegramClient>, router: CommandRouter) -> Self {
        Self { client, router }
    }

    pub async fn run(&self) {
        info!("🤖 Listening for bot commands");
        let mut offset = None;

        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("⚠️ Polling for updates failed, retrying in {:?}: {}", RETRY_DELAY, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                if let Some(command) = update.command() {
                    self.respond(command);
                }
            }
        }
    }

    fn respond(&self, command: InboundCommand) {
        let client = self.client.clone();
        let router = self.router.clone();
        tokio::spawn(async move {
            debug!("Handling {:?} from chat {}", command.command, command.chat_id);
            let reply = router.handle(&command).await;
            if let Err(e) = client.send(&command.chat_id, &reply).await {
                error!("Failed to reply to chat {}: {}", command.chat_id, e);
            }
        });
    }
}
