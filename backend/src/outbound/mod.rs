//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the PostgreSQL-backed user repository using Diesel.
//! - **ratelimit**: the in-process fixed-window rate limiter.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod persistence;
pub mod ratelimit;
