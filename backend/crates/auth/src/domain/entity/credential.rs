//! Credential Entity
//!
//! The secret-bearing half of a principal record. Kept apart from
//! [`Principal`](super::principal::Principal) so the projection handed to
//! handlers can never leak the hash or the stored refresh token.

use kernel::id::PrincipalId;
use platform::secret::HashedSecret;

/// Secret material stored for one principal
#[derive(Debug, Clone)]
pub struct Credential {
    pub principal_id: PrincipalId,
    /// Argon2id PHC string; produced once at write time
    pub secret_hash: HashedSecret,
    /// At most one live refresh token per principal. `None` means logged
    /// out; presenting any token then fails the equality check.
    pub current_refresh_token: Option<String>,
}

impl Credential {
    pub fn new(principal_id: PrincipalId, secret_hash: HashedSecret) -> Self {
        Self {
            principal_id,
            secret_hash,
            current_refresh_token: None,
        }
    }

    /// Constant-time comparison of a presented refresh token against the
    /// stored one. A missing stored token never matches.
    pub fn refresh_token_matches(&self, presented: &str) -> bool {
        match &self.current_refresh_token {
            Some(stored) => {
                platform::crypto::constant_time_eq(stored.as_bytes(), presented.as_bytes())
            }
            None => false,
        }
    }
}
