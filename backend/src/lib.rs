//! User directory backend: a rate-limited CRUD service over a `users` table.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, services,
//! and ports; `inbound` adapts HTTP requests onto the domain; `outbound`
//! adapts the domain ports onto PostgreSQL and the in-process rate limiter;
//! `server` assembles the actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
