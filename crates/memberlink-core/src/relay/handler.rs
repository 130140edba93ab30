//! Inbound event handling.
//!
//! The relay never reports failures back to the chat sender: unknown
//! senders, store errors, missing owner accounts and delivery failures are
//! all logged and the event is dropped.

use std::sync::Arc;

use memberlink_types::chat::{ChannelId, ChatUser, ChatUserId, InboundEvent};

use crate::relay::gateway::ChatGateway;
use crate::repository::account::AccountRepository;
use crate::repository::member::MemberRepository;
use crate::service::lookup::MemberLookupService;

/// Anything that consumes inbound chat events. Gateway adapters dispatch
/// into this trait so they stay independent of the relay's generics.
pub trait InboundHandler: Send + Sync + 'static {
    fn handle(&self, event: InboundEvent) -> impl std::future::Future<Output = ()> + Send;
}

/// Forwards messages from registered members to their owner and handles
/// greetings and welcomes.
pub struct ChatRelay<M, A, G>
where
    M: MemberRepository,
    A: AccountRepository,
    G: ChatGateway,
{
    lookup: MemberLookupService<M>,
    accounts: Arc<A>,
    gateway: Arc<G>,
    /// Lowercased greeting phrases.
    greetings: Vec<String>,
}

impl<M, A, G> ChatRelay<M, A, G>
where
    M: MemberRepository,
    A: AccountRepository,
    G: ChatGateway,
{
    pub fn new(
        lookup: MemberLookupService<M>,
        accounts: Arc<A>,
        gateway: Arc<G>,
        greetings: Vec<String>,
    ) -> Self {
        Self {
            lookup,
            accounts,
            gateway,
            greetings: greetings
                .into_iter()
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }

    /// Does `text` contain any configured greeting (case-insensitive)?
    pub fn is_greeting(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.greetings.iter().any(|g| text.contains(g.as_str()))
    }

    async fn on_message(&self, sender: &ChatUser, channel: &ChannelId, text: &str) {
        if sender.is_bot {
            tracing::trace!(sender = %sender.id, "ignoring bot message");
            return;
        }

        self.forward_to_owner(sender, text).await;

        if self.is_greeting(text) {
            let reply = format!("{} {} 😊", sender.mention(), text);
            if let Err(e) = self.gateway.send_to_channel(channel, &reply).await {
                tracing::warn!(channel = %channel, error = %e, "greeting reply failed");
            }
        }
    }

    async fn forward_to_owner(&self, sender: &ChatUser, text: &str) {
        let Some(username) = sender.username.as_deref() else {
            tracing::trace!(sender = %sender.id, "sender has no username, not relaying");
            return;
        };

        let owner = match self.lookup.resolve_owner(&sender.id.0, username).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::trace!(sender = %sender.id, "sender is not a registered member");
                return;
            }
            Err(e) => {
                tracing::warn!(sender = %sender.id, error = %e, "owner lookup failed");
                return;
            }
        };

        let account = match self.accounts.get_by_id(&owner).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::warn!(owner = %owner, "member owner account no longer exists");
                return;
            }
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "owner account lookup failed");
                return;
            }
        };

        let recipient = ChatUserId(account.chat_user_id.clone());
        let body = format!("Message from:{username}\n{text}");
        match self.gateway.send_direct_message(&recipient, &body).await {
            Ok(()) => tracing::debug!(sender = %sender.id, owner = %owner, "message relayed"),
            Err(e) => tracing::warn!(owner = %owner, error = %e, "relay delivery failed"),
        }
    }

    async fn on_member_joined(&self, user: &ChatUser, community: &str) {
        if user.is_bot {
            return;
        }
        let text = format!(
            "Welcome, {}! You joined {}. Enjoy your time in the server!",
            user.mention(),
            community
        );
        if let Err(e) = self.gateway.send_direct_message(&user.id, &text).await {
            tracing::warn!(user = %user.id, error = %e, "welcome message failed");
        }
    }
}

impl<M, A, G> InboundHandler for ChatRelay<M, A, G>
where
    M: MemberRepository + 'static,
    A: AccountRepository + 'static,
    G: ChatGateway + 'static,
{
    async fn handle(&self, event: InboundEvent) {
        match event {
            InboundEvent::Message {
                sender,
                channel,
                text,
            } => self.on_message(&sender, &channel, &text).await,
            InboundEvent::MemberJoined { user, community } => {
                self.on_member_joined(&user, &community).await
            }
        }
    }
}
