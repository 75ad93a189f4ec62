//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::pagination::{PageRequest, UserPage};
use crate::domain::user::{NewUser, User, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A write collided with the unique email constraint.
        DuplicateEmail { message: String } => "email already in use: {message}",
    }
}

/// Port for user persistence.
///
/// Every operation is a single transaction in the adapter: committed on
/// success, rolled back on error, with the connection released on every exit
/// path.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored record, including the
    /// generated id and timestamps.
    async fn insert(&self, new_user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch one page of users ordered by descending id, together with the
    /// total row count.
    async fn list(&self, page: PageRequest) -> Result<UserPage, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Case-insensitive substring search over name and email, ordered by
    /// descending id, returning at most `limit` records.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserRepositoryError>;

    /// Apply the supplied fields to an existing user, refresh `updated_at`,
    /// and return the stored record. Returns `None` when no row matches.
    ///
    /// Callers must not pass an empty patch; the no-op read lives in the
    /// service layer.
    async fn update(&self, id: UserId, patch: &UserPatch)
    -> Result<Option<User>, UserRepositoryError>;

    /// Delete a user by identifier. Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;

    /// Execute a trivial round-trip to verify the store is reachable.
    async fn ping(&self) -> Result<(), UserRepositoryError>;
}
