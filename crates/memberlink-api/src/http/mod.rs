//! HTTP/REST API layer for Memberlink.
//!
//! Axum-based JSON API with session-token authentication (cookie or bearer
//! header) and a uniform envelope response format.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
