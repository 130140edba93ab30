use memberlink_core::relay::ChatGateway;
use memberlink_types::chat::{ChannelId, ChatUserId};
use memberlink_types::error::ChatError;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::time::sleep;

/// `ChatGateway` backed by the Telegram Bot API.
///
/// Recipients and channels are Telegram numeric chat ids carried as strings.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn chat_id(raw: &str) -> Result<ChatId, ChatError> {
        raw.trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| ChatError::InvalidRecipient(raw.to_string()))
    }

    /// Send once, retrying a single time if Telegram asks us to back off.
    async fn send_with_retry(&self, chat: ChatId, text: &str) -> Result<(), ChatError> {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match self.bot.send_message(chat, text.to_string()).await {
                Ok(_) => return Ok(()),
                Err(teloxide::RequestError::RetryAfter(wait)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    tracing::debug!(chat = chat.0, ?wait, "rate limited, retrying");
                    sleep(wait).await;
                }
                Err(e) => return Err(ChatError::Transport(e.to_string())),
            }
        }
    }
}

impl ChatGateway for TelegramGateway {
    async fn send_direct_message(&self, recipient: &ChatUserId, text: &str) -> Result<(), ChatError> {
        // A private chat's id equals the user's id.
        let chat = Self::chat_id(&recipient.0)?;
        self.send_with_retry(chat, text).await
    }

    async fn send_to_channel(&self, channel: &ChannelId, text: &str) -> Result<(), ChatError> {
        let chat = Self::chat_id(&channel.0)?;
        self.send_with_retry(chat, text).await
    }
}
