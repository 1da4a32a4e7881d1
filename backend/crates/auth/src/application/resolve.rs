//! Identity Resolver Use Case
//!
//! From a presented access token to a loaded principal. Resolution goes
//! through the identity index (id → variant tag, O(1)) instead of scanning
//! the four collections in order; the in-memory directory documents the
//! reference scan order for the index-less case.

use std::sync::Arc;

use kernel::id::PrincipalId;

use crate::application::config::AuthConfig;
use crate::domain::entity::Principal;
use crate::domain::repository::PrincipalRepository;
use crate::domain::token::{TokenError, TokenKind};
use crate::domain::value_object::PrincipalKind;
use crate::error::{AuthError, AuthResult};

/// A principal whose access token verified and whose record was loaded.
/// Inactivity has already been rejected; gates still re-check it so they
/// stand alone.
#[derive(Debug, Clone)]
pub struct ResolvedPrincipal {
    pub principal: Principal,
}

impl ResolvedPrincipal {
    pub fn kind(&self) -> PrincipalKind {
        self.principal.kind()
    }

    pub fn id(&self) -> PrincipalId {
        self.principal.id
    }
}

/// Resolve Use Case
pub struct ResolveUseCase<R>
where
    R: PrincipalRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ResolveUseCase<R>
where
    R: PrincipalRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<ResolvedPrincipal> {
        let claims = self
            .config
            .codec()
            .verify(TokenKind::Access, access_token)
            .map_err(|e| match e {
                TokenError::Invalid => AuthError::TokenInvalid,
                TokenError::Expired => AuthError::TokenExpired,
                TokenError::Signing(msg) => AuthError::Tokening(msg),
            })?;

        let principal_id = PrincipalId::from_uuid(claims.principal_id);

        // The index decides the variant; a token surviving its record's
        // deletion resolves to nothing and fails generically.
        let kind = self
            .repo
            .kind_of(principal_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let principal = self
            .repo
            .find_by_id(kind, principal_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !principal.is_active {
            return Err(AuthError::AccountInactive);
        }

        Ok(ResolvedPrincipal { principal })
    }
}
