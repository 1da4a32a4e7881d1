//! Verification Toggle Use Case
//!
//! TPO-driven verification of Company and Alumni accounts. The permission
//! gate guarding the route has already run; this only performs the state
//! change.

use std::sync::Arc;

use kernel::id::PrincipalId;

use crate::domain::repository::PrincipalRepository;
use crate::domain::value_object::PrincipalKind;
use crate::error::{AuthError, AuthResult};

/// Verification Toggle Use Case
pub struct SetVerificationUseCase<R>
where
    R: PrincipalRepository,
{
    repo: Arc<R>,
}

impl<R> SetVerificationUseCase<R>
where
    R: PrincipalRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
        verified: bool,
    ) -> AuthResult<()> {
        if !kind.requires_verification() {
            return Err(AuthError::Validation(format!(
                "{kind} accounts are verified by construction"
            )));
        }

        if !self.repo.set_verified(kind, id, verified).await? {
            return Err(AuthError::NotFound);
        }

        tracing::info!(
            principal_id = %id,
            kind = %kind,
            verified,
            "Verification flag updated"
        );

        Ok(())
    }
}
