//! User CRUD domain service.
//!
//! Orchestrates the repository port and owns the operation-level policies:
//! pagination caps, the search result cap, the blank-search guard, and the
//! empty-patch no-op read. No HTTP or SQL concerns live here.

use std::sync::Arc;

use tracing::error;

use crate::domain::error::Error;
use crate::domain::pagination::{PageRequest, UserPage};
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::trace_id::TraceId;
use crate::domain::user::{NewUser, User, UserId, UserPatch};

/// Hard cap on search results.
pub const SEARCH_RESULT_CAP: i64 = 50;

/// Driving service for the users resource.
#[derive(Clone)]
pub struct UsersService {
    repository: Arc<dyn UserRepository>,
}

impl UsersService {
    /// Create a new service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Insert a new user and return the stored record.
    ///
    /// # Errors
    /// `duplicate_key` when the email is already registered; `internal_error`
    /// for storage failures.
    pub async fn create(&self, new_user: NewUser) -> Result<User, Error> {
        self.repository
            .insert(&new_user)
            .await
            .map_err(map_repository_error)
    }

    /// Fetch one page of users, newest id first, plus the total row count.
    pub async fn list(&self, page: PageRequest) -> Result<UserPage, Error> {
        self.repository
            .list(page)
            .await
            .map_err(map_repository_error)
    }

    /// Fetch a user by identifier; `None` when no row matches.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }

    /// Case-insensitive substring search over name and email.
    ///
    /// Capped at [`SEARCH_RESULT_CAP`] records. Blank queries are rejected
    /// here as well as at the HTTP boundary so no caller can drive the store
    /// with an unbounded pattern.
    pub async fn search(&self, query: &str) -> Result<Vec<User>, Error> {
        if query.trim().is_empty() {
            return Err(Error::invalid_request(
                r#"Search query parameter "q" is required"#,
            ));
        }
        self.repository
            .search(query, SEARCH_RESULT_CAP)
            .await
            .map_err(map_repository_error)
    }

    /// Apply a partial update and return the post-update record.
    ///
    /// An empty patch is a no-op read: the current record is returned and
    /// `updated_at` is untouched.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>, Error> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        self.repository
            .update(id, patch)
            .await
            .map_err(map_repository_error)
    }

    /// Delete a user; `false` when no row matched.
    pub async fn delete(&self, id: UserId) -> Result<bool, Error> {
        self.repository
            .delete(id)
            .await
            .map_err(map_repository_error)
    }

    /// Verify the backing store is reachable.
    ///
    /// # Errors
    /// Returns the raw port error so diagnostic callers can surface the
    /// failure description.
    pub async fn ping(&self) -> Result<(), UserRepositoryError> {
        self.repository.ping().await
    }
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            log_repository_failure("connection", &message);
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            log_repository_failure("query", &message);
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::duplicate_key("User with this email already exists")
        }
    }
}

fn log_repository_failure(kind: &str, message: &str) {
    match TraceId::current() {
        Some(trace_id) => {
            error!(%trace_id, kind, message, "user repository failure");
        }
        None => error!(kind, message, "user repository failure"),
    }
}
