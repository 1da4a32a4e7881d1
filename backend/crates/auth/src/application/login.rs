//! Login Use Case
//!
//! Per-variant credential login. The route determines the variant; there is
//! no unified login across collections.

use std::sync::Arc;

use platform::secret::ClearTextSecret;

use crate::application::config::AuthConfig;
use crate::application::session::{TokenPair, mint_and_persist};
use crate::domain::entity::Principal;
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::value_object::PrincipalKind;
use crate::error::{AuthError, AuthResult};

/// Input DTO for login
#[derive(Debug)]
pub struct LoginInput {
    /// Primary (email) or secondary identifier
    pub identifier: String,
    pub secret: String,
}

/// Output DTO for login
#[derive(Debug)]
pub struct LoginOutput {
    pub principal: Principal,
    pub tokens: TokenPair,
}

/// Login Use Case
pub struct LoginUseCase<R>
where
    R: PrincipalRepository + CredentialRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: PrincipalRepository + CredentialRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Failure order is fixed: unknown identifier → inactive → bad secret.
    /// The inactive check runs before the hash comparison so a deactivated
    /// account fails identically with or without the right secret.
    pub async fn execute(&self, kind: PrincipalKind, input: LoginInput) -> AuthResult<LoginOutput> {
        let identifier = input.identifier.trim();
        if identifier.is_empty() || input.secret.is_empty() {
            return Err(AuthError::Validation(
                "Identifier and secret are required".to_string(),
            ));
        }

        let principal = self
            .repo
            .find_by_identifier(kind, identifier)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !principal.is_active {
            return Err(AuthError::AccountInactive);
        }

        let credential = self
            .repo
            .find_credential(principal.id)
            .await?
            .ok_or(AuthError::NotFound)?;

        // Login accepts secrets that predate the current policy; only the
        // stored hash decides validity.
        let presented = ClearTextSecret::new_unchecked(input.secret);
        if !credential.secret_hash.verify(&presented, None) {
            return Err(AuthError::BadCredential);
        }

        let tokens = mint_and_persist(self.repo.as_ref(), &self.config, &principal).await?;

        tracing::info!(
            principal_id = %principal.id,
            kind = %kind,
            "Login succeeded, session rotated"
        );

        Ok(LoginOutput { principal, tokens })
    }
}
