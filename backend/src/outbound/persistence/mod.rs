//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the domain's `UserRepository` port via `diesel-async` with
//! `bb8` connection pooling. Row structs (`models`) and the table definition
//! (`schema`) are internal implementation details, never exposed to the
//! domain; every database error is mapped to a port error before it leaves
//! this module.

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
