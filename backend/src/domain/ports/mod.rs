//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod rate_limiter;
mod user_repository;

pub use rate_limiter::{RateLimitRule, RateLimiter};
pub use user_repository::{UserRepository, UserRepositoryError};
