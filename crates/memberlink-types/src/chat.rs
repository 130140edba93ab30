//! Gateway-agnostic chat event model.
//!
//! Gateway-specific fields (Telegram message ids, entities, ...) stay in the
//! adapter; the relay only sees these types.

use std::fmt;

/// A chat-gateway user id (Telegram numeric ids are carried as strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatUserId(pub String);

impl fmt::Display for ChatUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat or channel the bot can post into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The author of an inbound event.
#[derive(Debug, Clone)]
pub struct ChatUser {
    pub id: ChatUserId,
    /// Not every gateway user has a username.
    pub username: Option<String>,
    pub display_name: String,
    pub is_bot: bool,
}

impl ChatUser {
    /// How the bot addresses this user in replies.
    pub fn mention(&self) -> String {
        match &self.username {
            Some(username) => format!("@{username}"),
            None => self.display_name.clone(),
        }
    }
}

/// Events delivered by a chat gateway to the relay.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A text message from a user.
    Message {
        sender: ChatUser,
        channel: ChannelId,
        text: String,
    },
    /// A user joined a group or community the bot is in.
    MemberJoined { user: ChatUser, community: String },
}
