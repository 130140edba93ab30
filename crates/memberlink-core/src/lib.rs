//! Business logic and repository trait definitions for Memberlink.
//!
//! This crate defines the "ports" (repository and chat gateway traits) that
//! the infrastructure layer implements, the in-memory member directory, and
//! the services built on top of them. It depends only on `memberlink-types`
//! -- never on `memberlink-infra` or any database/IO crate.

pub mod cache;
pub mod relay;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
