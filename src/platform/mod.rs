pub mod discord;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::reply::Reply;

/// A message received from any platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform identifier (e.g., "telegram", "discord")
    pub platform: String,
    /// Platform-specific user ID as string
    pub user_id: String,
    /// Platform-specific chat/channel ID as string
    pub chat_id: String,
    /// Display name of the user
    pub user_name: String,
    /// The message text
    pub text: String,
}

/// Handle to a message the bot sent, used to edit it later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub message_id: String,
}

/// Outbound operations a platform offers the handler
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message to a chat/channel
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage>;

    /// Replace the content of a previously sent message.
    /// A reply without embed removes any embed the message had.
    async fn edit(&self, message: &SentMessage, reply: &Reply) -> Result<()>;
}
