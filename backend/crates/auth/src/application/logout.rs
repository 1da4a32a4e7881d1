//! Logout Use Case

use std::sync::Arc;

use kernel::id::PrincipalId;

use crate::domain::repository::CredentialRepository;
use crate::error::AuthResult;

/// Logout Use Case
///
/// Clears the stored refresh token; every previously issued refresh token
/// for the principal then fails the equality check. Idempotent.
pub struct LogoutUseCase<R>
where
    R: CredentialRepository,
{
    repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: CredentialRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, principal_id: PrincipalId) -> AuthResult<()> {
        self.repo.clear_refresh_token(principal_id).await?;
        tracing::info!(principal_id = %principal_id, "Session cleared");
        Ok(())
    }
}
