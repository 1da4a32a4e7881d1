//! In-Memory Principal Directory
//!
//! HashMap-backed implementation of the repository traits. Used by the
//! crate's tests and as the reference semantics for identity resolution:
//! where PostgreSQL consults the `principal_index` table, this directory
//! scans the four collections in the fixed order Student → Company →
//! Alumni → TPO and stops at the first match.

use std::collections::HashMap;
use std::sync::Mutex;

use kernel::id::PrincipalId;
use platform::secret::HashedSecret;
use uuid::Uuid;

use crate::domain::entity::{Credential, Principal};
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::value_object::PrincipalKind;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct DirectoryState {
    students: HashMap<Uuid, Principal>,
    companies: HashMap<Uuid, Principal>,
    alumni: HashMap<Uuid, Principal>,
    tpo_officers: HashMap<Uuid, Principal>,
    credentials: HashMap<Uuid, Credential>,
}

impl DirectoryState {
    fn collection(&self, kind: PrincipalKind) -> &HashMap<Uuid, Principal> {
        match kind {
            PrincipalKind::Student => &self.students,
            PrincipalKind::Company => &self.companies,
            PrincipalKind::Alumni => &self.alumni,
            PrincipalKind::Tpo => &self.tpo_officers,
        }
    }

    fn collection_mut(&mut self, kind: PrincipalKind) -> &mut HashMap<Uuid, Principal> {
        match kind {
            PrincipalKind::Student => &mut self.students,
            PrincipalKind::Company => &mut self.companies,
            PrincipalKind::Alumni => &mut self.alumni,
            PrincipalKind::Tpo => &mut self.tpo_officers,
        }
    }
}

/// In-memory directory over the four collections plus credentials
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a principal and its credential entirely. Physical deletion is
    /// a resource-layer concern in production; exposed here so tests can
    /// model a record deleted after token issuance.
    pub fn remove(&self, id: PrincipalId) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let uuid = id.into_uuid();
        for kind in PrincipalKind::LOOKUP_ORDER {
            state.collection_mut(kind).remove(&uuid);
        }
        state.credentials.remove(&uuid);
    }

    /// Flip `is_active` directly (deactivation is otherwise a resource-layer
    /// operation)
    pub fn set_active(&self, id: PrincipalId, active: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let uuid = id.into_uuid();
        for kind in PrincipalKind::LOOKUP_ORDER {
            if let Some(principal) = state.collection_mut(kind).get_mut(&uuid) {
                principal.is_active = active;
                return true;
            }
        }
        false
    }
}

impl PrincipalRepository for InMemoryDirectory {
    async fn kind_of(&self, id: PrincipalId) -> AuthResult<Option<PrincipalKind>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let uuid = id.into_uuid();
        // Reference resolution order; first match wins
        for kind in PrincipalKind::LOOKUP_ORDER {
            if state.collection(kind).contains_key(&uuid) {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
    ) -> AuthResult<Option<Principal>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.collection(kind).get(&id.into_uuid()).cloned())
    }

    async fn find_by_identifier(
        &self,
        kind: PrincipalKind,
        identifier: &str,
    ) -> AuthResult<Option<Principal>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let lowered = identifier.to_lowercase();
        Ok(state
            .collection(kind)
            .values()
            .find(|p| p.email.as_str() == lowered || p.secondary_identifier() == identifier)
            .cloned())
    }

    async fn create(&self, principal: &Principal, credential: &Credential) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let kind = principal.kind();

        let taken = state.collection(kind).values().any(|p| {
            p.email == principal.email
                || p.secondary_identifier() == principal.secondary_identifier()
        });
        if taken {
            return Err(AuthError::IdentifierTaken);
        }

        let uuid = principal.id.into_uuid();
        state.collection_mut(kind).insert(uuid, principal.clone());
        state.credentials.insert(uuid, credential.clone());
        Ok(())
    }

    async fn set_verified(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
        verified: bool,
    ) -> AuthResult<bool> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.collection_mut(kind).get_mut(&id.into_uuid()) {
            Some(principal) => {
                principal.is_verified = verified;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl CredentialRepository for InMemoryDirectory {
    async fn find_credential(&self, id: PrincipalId) -> AuthResult<Option<Credential>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.credentials.get(&id.into_uuid()).cloned())
    }

    async fn update_secret_hash(&self, id: PrincipalId, hash: &HashedSecret) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.credentials.get_mut(&id.into_uuid()) {
            Some(credential) => {
                credential.secret_hash = hash.clone();
                Ok(())
            }
            None => Err(AuthError::Unauthenticated),
        }
    }

    async fn store_refresh_token(&self, id: PrincipalId, token: &str) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.credentials.get_mut(&id.into_uuid()) {
            Some(credential) => {
                credential.current_refresh_token = Some(token.to_string());
                Ok(())
            }
            None => Err(AuthError::Unauthenticated),
        }
    }

    async fn clear_refresh_token(&self, id: PrincipalId) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(credential) = state.credentials.get_mut(&id.into_uuid()) {
            credential.current_refresh_token = None;
        }
        Ok(())
    }
}
