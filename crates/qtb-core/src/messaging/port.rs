use async_trait::async_trait;

use crate::{domain::ConversationId, messaging::types::ReplyMarkup, Result};

/// Port for sending replies back to a conversation.
///
/// Telegram is the first implementation; the shape leaves room for other
/// transports behind the same interface.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn reply(&self, chat: ConversationId, text: &str, markup: ReplyMarkup) -> Result<()>;
}
