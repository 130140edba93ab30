//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (memberlink-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod account;
pub mod member;
pub mod session;
