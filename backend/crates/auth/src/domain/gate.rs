//! Role/Permission Gate
//!
//! Composable authorization checks over a resolved principal. A gate is a
//! value, built once per route and cloned into the middleware; `check` runs
//! the configured checks in a fixed sequence and short-circuits on the first
//! failure with that check's specific error kind (no aggregation).
//!
//! Check order: variant → active → verified → role → permission. The active
//! check always runs even though the resolver rejects inactive principals
//! too; a gate must hold on its own when called outside the middleware
//! chain.

use crate::domain::entity::Principal;
use crate::domain::value_object::{PrincipalKind, TpoPermission, TpoRole};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Default)]
pub struct Gate {
    kinds: Option<Vec<PrincipalKind>>,
    require_verified: bool,
    roles: Option<Vec<TpoRole>>,
    permissions: Vec<TpoPermission>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the resolved variant to be one of `kinds`
    pub fn kinds(mut self, kinds: &[PrincipalKind]) -> Self {
        self.kinds = Some(kinds.to_vec());
        self
    }

    /// Require `is_verified` (meaningful for Company/Alumni; Student and TPO
    /// pass trivially since they are verified by construction)
    pub fn verified(mut self) -> Self {
        self.require_verified = true;
        self
    }

    /// Require the TPO role to be a member of `roles`. Membership, not
    /// seniority: Admin does not implicitly satisfy a Coordinator set.
    pub fn roles(mut self, roles: &[TpoRole]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }

    /// Require every permission in `permissions` to be granted
    pub fn permissions(mut self, permissions: &[TpoPermission]) -> Self {
        self.permissions.extend_from_slice(permissions);
        self
    }

    /// Run the configured checks in order, failing on the first violation
    pub fn check(&self, principal: &Principal) -> AuthResult<()> {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&principal.kind()) {
                return Err(AuthError::WrongPrincipalType);
            }
        }

        if !principal.is_active {
            return Err(AuthError::AccountInactive);
        }

        if self.require_verified && !principal.is_verified {
            return Err(AuthError::AccountUnverified);
        }

        if let Some(roles) = &self.roles {
            match principal.tpo_role() {
                Some(role) if roles.contains(&role) => {}
                _ => return Err(AuthError::InsufficientRole),
            }
        }

        for permission in &self.permissions {
            if !principal.has_permission(*permission) {
                return Err(AuthError::InsufficientPermission);
            }
        }

        Ok(())
    }
}
