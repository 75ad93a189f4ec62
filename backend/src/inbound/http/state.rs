//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain service and remain testable without I/O.

use crate::domain::UsersService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Driving service for the users resource and the health probe.
    pub users: UsersService,
}

impl HttpState {
    /// Construct state over the given service.
    #[must_use]
    pub fn new(users: UsersService) -> Self {
        Self { users }
    }
}
