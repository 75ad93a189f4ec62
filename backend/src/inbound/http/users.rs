//! Users API handlers.
//!
//! ```text
//! POST   /api/users          {"name":"Ada","email":"ada@example.com","phone":"555-0100"}
//! GET    /api/users?limit=10&offset=0
//! GET    /api/users/search?q=ada
//! GET    /api/users/{id}
//! PUT    /api/users/{id}     {"phone":"555-0199"}
//! DELETE /api/users/{id}
//! ```
//!
//! Handlers extract and coerce parameters, run payload validation, call the
//! domain service, and shape the JSON envelopes. No business logic lives
//! here.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Error, PageRequest, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_new_user, parse_user_patch};

/// Request body for `POST /api/users`.
///
/// Required fields are modelled as `Option` so their absence surfaces as a
/// structured `required` validation detail rather than a serde decode error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Name shown for the user (required, 1–255 characters).
    pub name: Option<String>,
    /// Contact email address (required, syntactically valid, unique).
    pub email: Option<String>,
    /// Optional contact phone number (≤50 characters).
    pub phone: Option<String>,
}

/// Request body for `PUT /api/users/{id}`.
///
/// Every field is optional; absence means "leave unchanged".
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Replacement name, when supplied.
    pub name: Option<String>,
    /// Replacement email address, when supplied.
    pub email: Option<String>,
    /// Replacement phone number, when supplied.
    pub phone: Option<String>,
}

/// Query string for `GET /api/users`.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Query string for `GET /api/users/search`.
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    q: Option<String>,
}

/// Envelope for successful create and update responses.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct UserMutationResponse {
    /// Human-readable confirmation.
    message: &'static str,
    /// The record after the mutation.
    #[schema(value_type = UserSchema)]
    data: User,
}

/// Envelope for `GET /api/users`.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ListUsersResponse {
    /// Records for this page, newest id first.
    #[schema(value_type = Vec<UserSchema>)]
    users: Vec<User>,
    /// Total number of rows in the table.
    total: i64,
    /// The limit actually applied (after defaulting and capping).
    limit: i64,
    /// The offset actually applied (after defaulting and clamping).
    offset: i64,
}

/// Envelope for `GET /api/users/search`.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct SearchUsersResponse {
    /// Matching records, newest id first, capped at 50.
    #[schema(value_type = Vec<UserSchema>)]
    results: Vec<User>,
    /// Number of records in `results`.
    count: usize,
}

/// Envelope for `DELETE /api/users/{id}`.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct DeleteUserResponse {
    /// Human-readable confirmation.
    message: &'static str,
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserMutationResponse),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = parse_new_user(payload.into_inner())?;
    let user = state.users.create(new_user).await?;
    Ok(HttpResponse::Created().json(UserMutationResponse {
        message: "User created successfully",
        data: user,
    }))
}

/// List users with pagination.
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, capped at 100"),
        ("offset" = Option<i64>, Query, description = "Rows to skip, clamped at 0")
    ),
    responses(
        (status = 200, description = "One page of users", body = ListUsersResponse),
        (status = 400, description = "Unparseable pagination parameters", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<HttpResponse> {
    let page = PageRequest::new(query.limit, query.offset);
    let result = state.users.list(page).await?;
    Ok(HttpResponse::Ok().json(ListUsersResponse {
        users: result.users,
        total: result.total,
        limit: page.limit(),
        offset: page.offset(),
    }))
}

/// Case-insensitive substring search over name and email.
#[utoipa::path(
    get,
    path = "/api/users/search",
    params(("q" = String, Query, description = "Substring to match against name or email")),
    responses(
        (status = 200, description = "Matching users", body = SearchUsersResponse),
        (status = 400, description = "Missing or empty query", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
pub async fn search_users(
    state: web::Data<HttpState>,
    query: web::Query<SearchUsersQuery>,
) -> ApiResult<HttpResponse> {
    let q = query.into_inner().q.unwrap_or_default();
    let results = state.users.search(&q).await?;
    Ok(HttpResponse::Ok().json(SearchUsersResponse {
        count: results.len(),
        results,
    }))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The user", body = UserSchema),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
pub async fn get_user(state: web::Data<HttpState>, id: web::Path<i32>) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .get(UserId::new(id.into_inner()))
        .await?
        .ok_or_else(user_not_found)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Apply a partial update to a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserMutationResponse),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let patch = parse_user_patch(payload.into_inner())?;
    let user = state
        .users
        .update(UserId::new(id.into_inner()), &patch)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(HttpResponse::Ok().json(UserMutationResponse {
        message: "User updated successfully",
        data: user,
    }))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    state: web::Data<HttpState>,
    id: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let removed = state.users.delete(UserId::new(id.into_inner())).await?;
    if !removed {
        return Err(user_not_found());
    }
    Ok(HttpResponse::Ok().json(DeleteUserResponse {
        message: "User deleted successfully",
    }))
}

#[cfg(test)]
mod tests;
