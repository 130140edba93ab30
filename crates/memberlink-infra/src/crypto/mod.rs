//! Credential hashing for Memberlink.
//!
//! - `password`: Argon2id password hashing
//! - `token`: random session tokens stored as SHA-256 digests

pub mod password;
pub mod token;
