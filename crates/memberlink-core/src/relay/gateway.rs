//! ChatGateway trait for outbound chat delivery.
//!
//! Defined in memberlink-core so the relay can send messages without
//! coupling to a specific chat platform. The Telegram adapter lives in
//! memberlink-infra.

use memberlink_types::chat::{ChannelId, ChatUserId};
use memberlink_types::error::ChatError;

/// Outbound side of a chat platform.
pub trait ChatGateway: Send + Sync {
    /// Send a private message to a single user.
    fn send_direct_message(
        &self,
        recipient: &ChatUserId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), ChatError>> + Send;

    /// Post a message into a chat or channel.
    fn send_to_channel(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), ChatError>> + Send;
}
