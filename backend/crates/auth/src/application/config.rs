//! Application Configuration
//!
//! Configuration for the auth application layer.

use std::time::Duration;

use crate::domain::token::TokenCodec;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for access tokens (32 bytes)
    pub access_secret: [u8; 32],
    /// HMAC key for refresh tokens (32 bytes, distinct from access)
    pub refresh_secret: [u8; 32],
    /// Access token TTL (short-lived, stateless)
    pub access_ttl: Duration,
    /// Refresh token TTL (long-lived, equality-checked against the store)
    pub refresh_ttl: Duration,
    /// Cookie name carrying the access token
    pub access_cookie_name: String,
    /// Cookie name carrying the refresh token
    pub refresh_cookie_name: String,
    /// Whether to require Secure cookies
    pub cookie_secure: bool,
    /// SameSite policy for both cookies
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: [0u8; 32],
            refresh_secret: [0u8; 32],
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            access_cookie_name: "accessToken".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (for development)
    pub fn with_random_secrets() -> Self {
        Self {
            access_secret: platform::crypto::random_key(),
            refresh_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Build the token codec over the two configured secrets
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(self.access_secret, self.refresh_secret)
    }

    pub fn access_ttl_ms(&self) -> i64 {
        self.access_ttl.as_millis() as i64
    }

    pub fn refresh_ttl_ms(&self) -> i64 {
        self.refresh_ttl.as_millis() as i64
    }
}
