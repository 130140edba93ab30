//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, cache maintenance, and business
//! rules. They depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod account;
pub mod credentials;
pub mod lookup;
pub mod member;
