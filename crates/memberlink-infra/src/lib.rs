//! Infrastructure layer for Memberlink.
//!
//! Contains implementations of the ports defined in `memberlink-core`:
//! SQLite storage, credential hashing (Argon2id passwords, SHA-256 session
//! tokens), configuration loading, and the Telegram chat gateway.

pub mod config;
pub mod crypto;
pub mod sqlite;
pub mod telegram;
