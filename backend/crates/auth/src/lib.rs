//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token codec, gates, repository traits
//! - `application/` - Use cases (login, refresh, logout, resolve, ...)
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Per-variant login for the four principal types (Student, Company, Alumni, TPO)
//! - Signed access/refresh token pairs with rotation-on-refresh
//! - Single active session per principal (stored refresh token comparison)
//! - Composable variant/state/role/permission gates for protected routes
//! - Fixed-window admission control ahead of all token work
//!
//! ## Security Model
//! - Secrets hashed with Argon2id (NIST SP 800-63B compliant)
//! - Access and refresh tokens signed with distinct HMAC-SHA256 keys
//! - Presenting a rotated-away refresh token is a hard, generic failure;
//!   replay, expiry and revocation are indistinguishable to the caller
//! - Rate limiting runs before any signature verification

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgPrincipalRepository;
pub use presentation::admission::{AdmissionConfig, AdmissionState, RouteCategory};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod token {
    pub use crate::domain::token::*;
}

pub mod gate {
    pub use crate::domain::gate::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryDirectory;
    pub use crate::infra::postgres::PgPrincipalRepository as PrincipalStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
