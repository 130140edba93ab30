//! Telegram chat gateway.
//!
//! - [`TelegramGateway`] implements the `ChatGateway` port on a teloxide `Bot`.
//! - [`run_relay`] long-polls Telegram and feeds [`InboundEvent`]s into an
//!   `InboundHandler` until the shutdown token is cancelled.
//!
//! [`InboundEvent`]: memberlink_types::chat::InboundEvent

mod events;
mod gateway;

pub use events::events_from_message;
pub use gateway::TelegramGateway;

use std::sync::Arc;

use memberlink_core::relay::InboundHandler;
use secrecy::{ExposeSecret, SecretString};
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

/// Build a bot client from the configured token.
pub fn bot_from_token(token: &SecretString) -> Bot {
    Bot::new(token.expose_secret())
}

/// Poll Telegram for updates and dispatch them to `handler`.
///
/// Returns once `shutdown` is cancelled and in-flight updates have drained.
pub async fn run_relay<H: InboundHandler>(bot: Bot, handler: Arc<H>, shutdown: CancellationToken) {
    match bot.get_me().await {
        Ok(me) => tracing::info!(bot = %me.username(), "chat relay connected"),
        Err(e) => tracing::warn!(error = %e, "could not fetch bot identity"),
    }

    let tree = dptree::entry().branch(Update::filter_message().endpoint(on_message::<H>));

    let mut dispatcher = Dispatcher::builder(bot, tree)
        .dependencies(dptree::deps![handler])
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => tracing::debug!(error = %e, "relay dispatcher was not running"),
        }
    });

    dispatcher.dispatch().await;
    tracing::info!("chat relay stopped");
}

async fn on_message<H: InboundHandler>(msg: Message, handler: Arc<H>) -> ResponseResult<()> {
    for event in events_from_message(&msg) {
        handler.handle(event).await;
    }
    Ok(())
}
