//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed user entity, the error taxonomy, and
//! the hexagonal ports the adapters plug into. Types are immutable and
//! validated at construction; serialisation contracts live in each type's
//! Rustdoc.

pub mod error;
pub mod pagination;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod users_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::pagination::{LIST_DEFAULT_LIMIT, LIST_LIMIT_CAP, PageRequest, UserPage};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, PHONE_MAX, PhoneNumber, USER_NAME_MAX, User, UserFieldError,
    UserId, UserName, UserPatch,
};
pub use self::users_service::{SEARCH_RESULT_CAP, UsersService};
