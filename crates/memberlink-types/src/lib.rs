//! Shared domain types for Memberlink.
//!
//! This crate contains the core domain types used across the service:
//! Member, Account, chat events, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod account;
pub mod chat;
pub mod config;
pub mod error;
pub mod fields;
pub mod member;
