use async_trait::async_trait;
use crate::types::OutboundMessage;
use crate::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message to one chat. Fails with `Error::Delivery`.
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> Result<()>;
}
