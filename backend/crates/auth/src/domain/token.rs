//! Token Codec
//!
//! Stateless signing and verification of the two session token kinds.
//! A token is `base64url(claims JSON) . base64url(HMAC-SHA256(secret, claims))`
//! with a distinct 32-byte secret per kind, so a leaked refresh secret cannot
//! mint access tokens and vice versa.
//!
//! No revocation state is consulted here; refresh-token revocation is the
//! stored-token equality check one layer up in the session issuer.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::value_object::PrincipalKind;
use platform::crypto::{constant_time_eq, from_base64url, random_bytes, to_base64url};

type HmacSha256 = Hmac<Sha256>;

/// The two token kinds. Verification of a token under the wrong kind's
/// secret fails the signature check; the embedded kind is checked anyway so
/// the failure is deterministic even if both secrets were configured equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Token verification/signing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature mismatch, malformed wire format, or wrong token kind
    #[error("Invalid token")]
    Invalid,

    /// `exp_ms` has passed relative to the supplied clock
    #[error("Token expired")]
    Expired,

    /// The signing primitive itself failed (misconfigured secret)
    #[error("Token signing failure: {0}")]
    Signing(String),
}

/// Signed claim bundle carried by both token kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Per-issuance nonce. Without it two mints for the same principal in
    /// the same clock tick would be byte-identical, and rotating a refresh
    /// token could hand back the token being rotated.
    pub jti: String,
    pub principal_id: Uuid,
    /// Variant tag embedded at issuance; lets refresh skip an index lookup
    pub variant: PrincipalKind,
    pub token_kind: TokenKind,
    /// Expiry as epoch milliseconds
    pub exp_ms: i64,
    /// Small free-form claim set (session scope markers and the like)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Stateless codec over the two per-kind secrets
#[derive(Clone)]
pub struct TokenCodec {
    access_secret: [u8; 32],
    refresh_secret: [u8; 32],
}

impl TokenCodec {
    pub fn new(access_secret: [u8; 32], refresh_secret: [u8; 32]) -> Self {
        Self {
            access_secret,
            refresh_secret,
        }
    }

    fn secret(&self, kind: TokenKind) -> &[u8; 32] {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    /// Sign a token expiring `ttl_ms` from now
    pub fn issue(
        &self,
        kind: TokenKind,
        principal_id: Uuid,
        variant: PrincipalKind,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl_ms: i64,
    ) -> Result<String, TokenError> {
        self.issue_at(kind, principal_id, variant, extra, ttl_ms, now_epoch_ms())
    }

    /// Sign a token against a supplied clock (deterministic tests)
    pub fn issue_at(
        &self,
        kind: TokenKind,
        principal_id: Uuid,
        variant: PrincipalKind,
        extra: serde_json::Map<String, serde_json::Value>,
        ttl_ms: i64,
        now_ms: i64,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            jti: to_base64url(&random_bytes(12)),
            principal_id,
            variant,
            token_kind: kind,
            exp_ms: now_ms + ttl_ms,
            extra,
        };

        let payload =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;
        let mac = sign(self.secret(kind), &payload)?;

        Ok(format!("{}.{}", to_base64url(&payload), to_base64url(&mac)))
    }

    /// Verify a token against the current wall clock
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(kind, token, now_epoch_ms())
    }

    /// Verify a token against a supplied clock
    ///
    /// The signature is checked before the payload is parsed; expiry is
    /// checked last so a forged token never learns whether its expiry would
    /// have passed.
    pub fn verify_at(
        &self,
        kind: TokenKind,
        token: &str,
        now_ms: i64,
    ) -> Result<TokenClaims, TokenError> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;

        let payload = from_base64url(payload_b64).map_err(|_| TokenError::Invalid)?;
        let mac = from_base64url(mac_b64).map_err(|_| TokenError::Invalid)?;

        let expected = sign(self.secret(kind), &payload)?;
        if !constant_time_eq(&mac, &expected) {
            return Err(TokenError::Invalid);
        }

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if claims.token_kind != kind {
            return Err(TokenError::Invalid);
        }

        if claims.exp_ms <= now_ms {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .finish()
    }
}

fn sign(secret: &[u8; 32], payload: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new([1u8; 32], [2u8; 32])
    }

    fn extra(pairs: &[(&str, &str)]) -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let codec = codec();
        let id = Uuid::new_v4();
        let extra = extra(&[("scope", "portal")]);

        let token = codec
            .issue_at(
                TokenKind::Access,
                id,
                PrincipalKind::Student,
                extra.clone(),
                60_000,
                1_000,
            )
            .unwrap();

        let claims = codec.verify_at(TokenKind::Access, &token, 2_000).unwrap();
        assert_eq!(claims.principal_id, id);
        assert_eq!(claims.variant, PrincipalKind::Student);
        assert_eq!(claims.token_kind, TokenKind::Access);
        assert_eq!(claims.exp_ms, 61_000);
        assert_eq!(claims.extra, extra);
    }

    #[test]
    fn test_zero_ttl_expires_once_clock_advances() {
        let codec = codec();
        let token = codec
            .issue_at(
                TokenKind::Access,
                Uuid::new_v4(),
                PrincipalKind::Tpo,
                Default::default(),
                0,
                1_000,
            )
            .unwrap();

        assert_eq!(
            codec.verify_at(TokenKind::Access, &token, 1_001),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let codec = codec();
        let token = codec
            .issue_at(
                TokenKind::Refresh,
                Uuid::new_v4(),
                PrincipalKind::Alumni,
                Default::default(),
                500,
                0,
            )
            .unwrap();

        assert!(codec.verify_at(TokenKind::Refresh, &token, 499).is_ok());
        assert_eq!(
            codec.verify_at(TokenKind::Refresh, &token, 500),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_same_instant_issues_distinct_tokens() {
        let codec = codec();
        let id = Uuid::new_v4();

        // Same principal, same clock tick: rotation depends on the new
        // refresh token differing from the one being rotated
        let first = codec
            .issue_at(
                TokenKind::Refresh,
                id,
                PrincipalKind::Student,
                Default::default(),
                60_000,
                1_000,
            )
            .unwrap();
        let second = codec
            .issue_at(
                TokenKind::Refresh,
                id,
                PrincipalKind::Student,
                Default::default(),
                60_000,
                1_000,
            )
            .unwrap();

        assert_ne!(first, second);
        assert!(codec.verify_at(TokenKind::Refresh, &first, 1_001).is_ok());
        assert!(codec.verify_at(TokenKind::Refresh, &second, 1_001).is_ok());
    }

    #[test]
    fn test_kind_secrets_are_disjoint() {
        let codec = codec();
        let token = codec
            .issue_at(
                TokenKind::Refresh,
                Uuid::new_v4(),
                PrincipalKind::Company,
                Default::default(),
                60_000,
                0,
            )
            .unwrap();

        // A refresh token must never verify as an access token
        assert_eq!(
            codec.verify_at(TokenKind::Access, &token, 1),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_kind_claim_checked_even_with_equal_secrets() {
        let codec = TokenCodec::new([7u8; 32], [7u8; 32]);
        let token = codec
            .issue_at(
                TokenKind::Refresh,
                Uuid::new_v4(),
                PrincipalKind::Student,
                Default::default(),
                60_000,
                0,
            )
            .unwrap();

        assert_eq!(
            codec.verify_at(TokenKind::Access, &token, 1),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec
            .issue_at(
                TokenKind::Access,
                Uuid::new_v4(),
                PrincipalKind::Student,
                Default::default(),
                60_000,
                0,
            )
            .unwrap();

        let (payload_b64, mac_b64) = token.split_once('.').unwrap();
        let mut payload = from_base64url(payload_b64).unwrap();
        payload[0] ^= 0x01;
        let forged = format!("{}.{}", to_base64url(&payload), mac_b64);

        assert_eq!(
            codec.verify_at(TokenKind::Access, &forged, 1),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        for garbage in ["", "no-dot", "a.b", "!!.!!", "a.b.c"] {
            assert_eq!(
                codec.verify_at(TokenKind::Access, garbage, 0),
                Err(TokenError::Invalid),
                "token {garbage:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let a = TokenCodec::new([1u8; 32], [2u8; 32]);
        let b = TokenCodec::new([9u8; 32], [2u8; 32]);

        let token = a
            .issue_at(
                TokenKind::Access,
                Uuid::new_v4(),
                PrincipalKind::Student,
                Default::default(),
                60_000,
                0,
            )
            .unwrap();

        assert_eq!(
            b.verify_at(TokenKind::Access, &token, 1),
            Err(TokenError::Invalid)
        );
    }
}
