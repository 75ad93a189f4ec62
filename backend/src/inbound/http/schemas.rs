//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The path exists but does not support the request method.
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    /// A uniqueness constraint rejected the write.
    #[schema(rename = "duplicate_key")]
    DuplicateKey,
    /// The client exhausted its request quota for this operation.
    #[schema(rename = "rate_limit_exceeded")]
    RateLimitExceeded,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// The human-readable message is published under the `error` key.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Validation failed")]
    error: String,
    /// Per-field violation entries for validation failures.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserSchema {
    /// Storage-assigned identifier.
    #[schema(example = 42)]
    id: i32,
    /// Name shown for the user.
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// Contact email address, unique across the store.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Optional contact phone number.
    #[schema(example = "+44 20 7946 0000")]
    phone: Option<String>,
    /// Creation instant (RFC 3339).
    #[schema(value_type = String, example = "2026-05-01T12:00:00Z")]
    created_at: String,
    /// Instant of the most recent mutation (RFC 3339).
    #[schema(value_type = String, example = "2026-05-01T12:00:00Z")]
    updated_at: String,
}

#[cfg(test)]
mod tests {
    use utoipa::PartialSchema;

    use super::*;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_wire_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "not_found",
            "method_not_allowed",
            "duplicate_key",
            "rate_limit_exceeded",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_publishes_the_error_key() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("\"error\""));
        assert!(schema_json.contains("details"));
    }

    #[test]
    fn user_schema_matches_the_wire_fields() {
        let schema_json = schema_to_json::<UserSchema>();
        for field in ["name", "email", "phone", "created_at", "updated_at"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }
}
