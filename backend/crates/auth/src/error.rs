//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Token failures (`TokenInvalid`, `TokenExpired`, `Unauthenticated`) are kept
//! distinct internally for logging, but all surface with the same generic
//! message and status: a caller must not be able to tell an expired token
//! from a revoked or fabricated one.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No principal for the given identifier in this variant's collection
    #[error("Account not found")]
    NotFound,

    /// Identifier resolves but the secret does not match
    #[error("Invalid credentials")]
    BadCredential,

    /// Principal exists but `is_active` is false
    #[error("Account is inactive")]
    AccountInactive,

    /// Company/Alumni principal exists but has not been verified
    #[error("Account is not verified")]
    AccountUnverified,

    /// Token signature mismatch or malformed payload
    #[error("Authentication required")]
    TokenInvalid,

    /// Token expiry has passed
    #[error("Authentication required")]
    TokenExpired,

    /// Token missing, principal gone, or stored-refresh-token mismatch
    #[error("Authentication required")]
    Unauthenticated,

    /// Resolved variant is not in the route's allowed set
    #[error("Wrong principal type for this resource")]
    WrongPrincipalType,

    /// TPO role is not in the required set
    #[error("Insufficient role")]
    InsufficientRole,

    /// TPO permission set does not cover the required set
    #[error("Insufficient permission")]
    InsufficientPermission,

    /// Email or secondary identifier already registered in this variant
    #[error("Identifier already registered")]
    IdentifierTaken,

    /// Admission control rejected the request before authentication
    #[error("Too many requests")]
    QuotaExceeded { retry_after_secs: i64 },

    /// Request payload failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Token signing/verification primitive itself errored (fatal)
    #[error("Token signing failed: {0}")]
    Tokening(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::BadCredential => StatusCode::UNAUTHORIZED,
            AuthError::AccountInactive | AuthError::AccountUnverified => StatusCode::FORBIDDEN,
            AuthError::TokenInvalid | AuthError::TokenExpired | AuthError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::WrongPrincipalType
            | AuthError::InsufficientRole
            | AuthError::InsufficientPermission => StatusCode::FORBIDDEN,
            AuthError::IdentifierTaken => StatusCode::CONFLICT,
            AuthError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Tokening(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::BadCredential
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::AccountInactive
            | AuthError::AccountUnverified
            | AuthError::WrongPrincipalType
            | AuthError::InsufficientRole
            | AuthError::InsufficientPermission => ErrorKind::Forbidden,
            AuthError::IdentifierTaken => ErrorKind::Conflict,
            AuthError::QuotaExceeded { .. } => ErrorKind::TooManyRequests,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Tokening(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Tokening(msg) => {
                tracing::error!(message = %msg, "Token primitive failure");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::BadCredential => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::QuotaExceeded { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Request rejected by admission control");
            }
            _ => {
                tracing::debug!(error = ?self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let retry_after = match &self {
            AuthError::QuotaExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = self.to_app_error().into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Signing(msg) => AuthError::Tokening(msg),
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<platform::secret::SecretPolicyError> for AuthError {
    fn from(err: platform::secret::SecretPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<platform::secret::SecretHashError> for AuthError {
    fn from(err: platform::secret::SecretHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
