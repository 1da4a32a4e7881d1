//! Session Minting
//!
//! Shared by the login and refresh use cases: mint a fresh access/refresh
//! pair and persist the refresh token as the principal's single current one.
//! The overwrite is what invalidates any previously issued session.
//!
//! The persist is not transactional with delivery to the caller; a crash
//! between the write and the response loses the session and the client must
//! log in again. Accepted trade-off, not silent corruption.

use crate::application::config::AuthConfig;
use crate::domain::entity::Principal;
use crate::domain::repository::CredentialRepository;
use crate::domain::token::TokenKind;
use crate::error::AuthResult;

/// Freshly minted access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at_ms: i64,
}

pub(crate) async fn mint_and_persist<C>(
    credential_repo: &C,
    config: &AuthConfig,
    principal: &Principal,
) -> AuthResult<TokenPair>
where
    C: CredentialRepository,
{
    let codec = config.codec();
    let now_ms = chrono::Utc::now().timestamp_millis();

    let access_token = codec.issue_at(
        TokenKind::Access,
        principal.id.into_uuid(),
        principal.kind(),
        Default::default(),
        config.access_ttl_ms(),
        now_ms,
    )?;

    let refresh_token = codec.issue_at(
        TokenKind::Refresh,
        principal.id.into_uuid(),
        principal.kind(),
        Default::default(),
        config.refresh_ttl_ms(),
        now_ms,
    )?;

    credential_repo
        .store_refresh_token(principal.id, &refresh_token)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_expires_at_ms: now_ms + config.access_ttl_ms(),
    })
}
