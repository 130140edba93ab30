use memberlink_types::chat::{ChannelId, ChatUser, ChatUserId, InboundEvent};
use teloxide::types::{Message, User};

fn chat_user(user: &User) -> ChatUser {
    ChatUser {
        id: ChatUserId(user.id.0.to_string()),
        username: user.username.clone(),
        display_name: user.full_name(),
        is_bot: user.is_bot,
    }
}

/// Translate a Telegram message into relay events.
///
/// A service message announcing new chat members yields one `MemberJoined`
/// per human member; a text message yields one `Message`. Anything else
/// (stickers, photos without captions, ...) yields nothing.
pub fn events_from_message(msg: &Message) -> Vec<InboundEvent> {
    let mut events = Vec::new();

    if let Some(new_members) = msg.new_chat_members() {
        let community = msg.chat.title().unwrap_or("the group").to_string();
        events.extend(
            new_members
                .iter()
                .filter(|user| !user.is_bot)
                .map(|user| InboundEvent::MemberJoined {
                    user: chat_user(user),
                    community: community.clone(),
                }),
        );
    }

    if let (Some(from), Some(text)) = (msg.from(), msg.text()) {
        events.push(InboundEvent::Message {
            sender: chat_user(from),
            channel: ChannelId(msg.chat.id.0.to_string()),
            text: text.to_string(),
        });
    }

    events
}
