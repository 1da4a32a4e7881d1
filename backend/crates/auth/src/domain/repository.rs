//! Repository Traits
//!
//! Interfaces over the credential store. Implementations live in the
//! infrastructure layer (PostgreSQL for production, an in-memory directory
//! for tests).

use kernel::id::PrincipalId;
use platform::secret::HashedSecret;

use crate::domain::entity::{Credential, Principal};
use crate::domain::value_object::PrincipalKind;
use crate::error::AuthResult;

/// Principal directory: identity index plus the four variant collections
#[trait_variant::make(PrincipalRepository: Send)]
pub trait LocalPrincipalRepository {
    /// O(1) identity index lookup: which variant owns this id, if any
    async fn kind_of(&self, id: PrincipalId) -> AuthResult<Option<PrincipalKind>>;

    /// Load the non-secret projection from the variant's collection
    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
    ) -> AuthResult<Option<Principal>>;

    /// Lookup by primary (email) or secondary identifier within exactly one
    /// variant collection; login is per-variant, never unified
    async fn find_by_identifier(
        &self,
        kind: PrincipalKind,
        identifier: &str,
    ) -> AuthResult<Option<Principal>>;

    /// Persist a new principal and its credential atomically, registering
    /// the id in the identity index. Fails with `IdentifierTaken` when
    /// either identifier is already used within the variant.
    async fn create(&self, principal: &Principal, credential: &Credential) -> AuthResult<()>;

    /// Flip the verification flag; returns false when the id is unknown
    async fn set_verified(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
        verified: bool,
    ) -> AuthResult<bool>;
}

/// Secret-material store keyed by principal id
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    async fn find_credential(&self, id: PrincipalId) -> AuthResult<Option<Credential>>;

    /// Re-hash happens at the caller; this only swaps the stored hash
    async fn update_secret_hash(&self, id: PrincipalId, hash: &HashedSecret) -> AuthResult<()>;

    /// Overwrite the single current refresh token. Rotation and login both
    /// land here; the previous session is invalidated by the overwrite.
    async fn store_refresh_token(&self, id: PrincipalId, token: &str) -> AuthResult<()>;

    /// Logout: clear the stored token so any presented token fails equality
    async fn clear_refresh_token(&self, id: PrincipalId) -> AuthResult<()>;
}
