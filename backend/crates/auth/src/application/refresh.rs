//! Refresh Use Case
//!
//! Rotation-on-every-refresh. Verification failure, an unknown principal and
//! a stored-token mismatch all collapse into the same generic
//! `Unauthenticated`: a replayed, rotated-away token must be
//! indistinguishable from an expired or fabricated one.

use std::sync::Arc;

use kernel::id::PrincipalId;

use crate::application::config::AuthConfig;
use crate::application::session::{TokenPair, mint_and_persist};
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::token::TokenKind;
use crate::error::{AuthError, AuthResult};

/// Refresh Use Case
pub struct RefreshUseCase<R>
where
    R: PrincipalRepository + CredentialRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshUseCase<R>
where
    R: PrincipalRepository + CredentialRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self
            .config
            .codec()
            .verify(TokenKind::Refresh, refresh_token)
            .map_err(|e| match e {
                // Signature and expiry failures fold into the generic kind
                crate::domain::token::TokenError::Signing(msg) => AuthError::Tokening(msg),
                _ => AuthError::Unauthenticated,
            })?;

        let principal_id = PrincipalId::from_uuid(claims.principal_id);

        let principal = self
            .repo
            .find_by_id(claims.variant, principal_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !principal.is_active {
            return Err(AuthError::AccountInactive);
        }

        let credential = self
            .repo
            .find_credential(principal_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        // The rotation invariant: only the most recently persisted token is
        // live. Anything else, including a token this very principal was
        // issued earlier, is a hard generic failure.
        if !credential.refresh_token_matches(refresh_token) {
            tracing::warn!(
                principal_id = %principal_id,
                "Refresh token does not match stored value"
            );
            return Err(AuthError::Unauthenticated);
        }

        let tokens = mint_and_persist(self.repo.as_ref(), &self.config, &principal).await?;

        tracing::info!(principal_id = %principal_id, "Session refreshed and rotated");

        Ok(tokens)
    }
}
