//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every operation checks out one pooled connection and runs inside a single
//! transaction: committed on success, rolled back on any error, with the
//! connection released on every exit path. Unique-constraint violations are
//! the only database failure with a dedicated port error; everything else is
//! collapsed to `connection`/`query` after logging the detail.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    EmailAddress, NewUser, PageRequest, PhoneNumber, User, UserId, UserName, UserPage, UserPatch,
};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository over the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    let (PoolError::Checkout { message } | PoolError::Build { message }) = error;
    UserRepositoryError::connection(message)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserRepositoryError::duplicate_email(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserRepositoryError::query("database query error"),
        _ => UserRepositoryError::query("database error"),
    }
}

/// Convert a stored row into the domain entity.
///
/// Rows only enter the table through the validating domain constructors, so
/// a conversion failure means the table was mutated out of band; it surfaces
/// as a query error rather than a panic.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        name,
        email,
        phone,
        created_at,
        updated_at,
    } = row;
    let name = UserName::new(name)
        .map_err(|err| UserRepositoryError::query(format!("corrupted name in database: {err}")))?;
    let email = EmailAddress::new(email)
        .map_err(|err| UserRepositoryError::query(format!("corrupted email in database: {err}")))?;
    let phone = phone
        .map(PhoneNumber::new)
        .transpose()
        .map_err(|err| UserRepositoryError::query(format!("corrupted phone in database: {err}")))?;
    Ok(User::new(
        UserId::new(id),
        name,
        email,
        phone,
        created_at,
        updated_at,
    ))
}

/// Escape `ILIKE` metacharacters so user input always matches literally.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: new_user.name.as_ref(),
            email: new_user.email.as_ref(),
            phone: new_user.phone.as_ref().map(AsRef::as_ref),
        };

        let stored: UserRow = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_user(stored)
    }

    async fn list(&self, page: PageRequest) -> Result<UserPage, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (rows, total) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let total: i64 = users::table.count().get_result(conn).await?;
                    let rows: Vec<UserRow> = users::table
                        .order(users::id.desc())
                        .limit(page.limit())
                        .offset(page.offset())
                        .select(UserRow::as_select())
                        .load(conn)
                        .await?;
                    Ok((rows, total))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let users = rows.into_iter().map(row_to_user).collect::<Result<_, _>>()?;
        Ok(UserPage { users, total })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    users::table
                        .find(id.as_i32())
                        .select(UserRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = format!("%{}%", escape_like(query));

        let rows: Vec<UserRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    users::table
                        .filter(
                            users::name
                                .ilike(pattern.clone())
                                .or(users::email.ilike(pattern)),
                        )
                        .order(users::id.desc())
                        .limit(limit)
                        .select(UserRow::as_select())
                        .load(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserChangeset {
            name: patch.name.as_ref().map(AsRef::as_ref),
            email: patch.email.as_ref().map(AsRef::as_ref),
            phone: patch.phone.as_ref().map(AsRef::as_ref),
        };

        let row: Option<UserRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::update(users::table.find(id.as_i32()))
                        .set((&changeset, users::updated_at.eq(diesel::dsl::now)))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(users::table.find(id.as_i32()))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
