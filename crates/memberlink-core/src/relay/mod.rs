//! Chat relay: routes inbound chat events to owners and answers greetings.

pub mod gateway;
pub mod handler;

pub use gateway::ChatGateway;
pub use handler::{ChatRelay, InboundHandler};
