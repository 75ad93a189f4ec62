//! Payload validation for the users endpoints.
//!
//! Converts raw request DTOs into validated domain inputs, running every
//! field check and collecting one structured entry per offending field. The
//! whole payload is accepted or rejected together; there is no partial
//! acceptance.

use serde_json::{Value, json};

use crate::domain::{Error, NewUser, UserFieldError, UserName, UserPatch};
use crate::domain::{EmailAddress, PhoneNumber};

use super::users::{CreateUserRequest, UpdateUserRequest};

/// One per-field violation destined for the error `details` array.
struct Violation {
    field: &'static str,
    code: &'static str,
    message: String,
}

impl Violation {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            code: "required",
            message: format!("{field} is required"),
        }
    }
}

impl From<UserFieldError> for Violation {
    fn from(error: UserFieldError) -> Self {
        Self {
            field: error.field(),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

fn validation_error(violations: Vec<Violation>) -> Error {
    let details: Vec<Value> = violations
        .iter()
        .map(|violation| {
            json!({
                "field": violation.field,
                "code": violation.code,
                "message": violation.message,
            })
        })
        .collect();
    Error::invalid_request("Validation failed").with_details(Value::Array(details))
}

fn check<T>(result: Result<T, UserFieldError>, violations: &mut Vec<Violation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            violations.push(error.into());
            None
        }
    }
}

/// Validate a create payload into a [`NewUser`].
///
/// `name` and `email` are required; absence yields a `required` entry.
/// `phone` is optional and may be an empty string.
pub(crate) fn parse_new_user(payload: CreateUserRequest) -> Result<NewUser, Error> {
    let CreateUserRequest { name, email, phone } = payload;
    let mut violations = Vec::new();

    let name = match name {
        Some(raw) => check(UserName::new(raw), &mut violations),
        None => {
            violations.push(Violation::required("name"));
            None
        }
    };
    let email = match email {
        Some(raw) => check(EmailAddress::new(raw), &mut violations),
        None => {
            violations.push(Violation::required("email"));
            None
        }
    };
    let phone = phone.and_then(|raw| check(PhoneNumber::new(raw), &mut violations));

    match (name, email, violations.is_empty()) {
        (Some(name), Some(email), true) => Ok(NewUser { name, email, phone }),
        _ => Err(validation_error(violations)),
    }
}

/// Validate an update payload into a [`UserPatch`].
///
/// Every field is optional: absence (and JSON `null`) means "leave
/// unchanged". An entirely empty payload is a valid, empty patch.
pub(crate) fn parse_user_patch(payload: UpdateUserRequest) -> Result<UserPatch, Error> {
    let UpdateUserRequest { name, email, phone } = payload;
    let mut violations = Vec::new();

    let name = name.and_then(|raw| check(UserName::new(raw), &mut violations));
    let email = email.and_then(|raw| check(EmailAddress::new(raw), &mut violations));
    let phone = phone.and_then(|raw| check(PhoneNumber::new(raw), &mut violations));

    if violations.is_empty() {
        Ok(UserPatch { name, email, phone })
    } else {
        Err(validation_error(violations))
    }
}
