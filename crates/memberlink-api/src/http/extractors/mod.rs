//! Custom axum extractors.

pub mod auth;
pub mod json;
pub mod query;
