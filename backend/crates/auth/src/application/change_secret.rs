//! Secret Change Use Case
//!
//! Verifies the current secret, re-hashes the replacement, and clears the
//! stored refresh token so every existing session must log in again.

use std::sync::Arc;

use kernel::id::PrincipalId;
use platform::secret::ClearTextSecret;

use crate::domain::repository::CredentialRepository;
use crate::error::{AuthError, AuthResult};

/// Input DTO for secret change
#[derive(Debug)]
pub struct ChangeSecretInput {
    pub current_secret: String,
    pub new_secret: String,
}

/// Secret Change Use Case
pub struct ChangeSecretUseCase<R>
where
    R: CredentialRepository,
{
    repo: Arc<R>,
}

impl<R> ChangeSecretUseCase<R>
where
    R: CredentialRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        principal_id: PrincipalId,
        input: ChangeSecretInput,
    ) -> AuthResult<()> {
        let credential = self
            .repo
            .find_credential(principal_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let current = ClearTextSecret::new_unchecked(input.current_secret);
        if !credential.secret_hash.verify(&current, None) {
            return Err(AuthError::BadCredential);
        }

        // Only the replacement is held to the current policy
        let new_secret = ClearTextSecret::new(input.new_secret)?;
        let new_hash = new_secret.hash(None)?;

        self.repo.update_secret_hash(principal_id, &new_hash).await?;
        self.repo.clear_refresh_token(principal_id).await?;

        tracing::info!(
            principal_id = %principal_id,
            "Secret changed, sessions invalidated"
        );

        Ok(())
    }
}
