//! Principal Entity
//!
//! The tagged union over the four principal variants. Common attributes live
//! on [`Principal`]; everything variant-specific lives in [`VariantProfile`].
//! The secret hash and stored refresh token are deliberately not here — they
//! belong to the [`Credential`](super::credential::Credential) entity so a
//! loaded principal is always safe to serialize outward.

use chrono::Utc;
use kernel::id::PrincipalId;

use crate::domain::value_object::{Email, PrincipalKind, TpoPermission, TpoRole};

/// Variant-specific projection data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantProfile {
    Student {
        enrollment_number: String,
        branch: Option<String>,
        graduation_year: Option<i16>,
    },
    Company {
        company_name: String,
        website: Option<String>,
    },
    Alumni {
        enrollment_number: String,
        graduation_year: Option<i16>,
        current_company: Option<String>,
    },
    Tpo {
        employee_id: String,
        role: TpoRole,
        permissions: Vec<TpoPermission>,
    },
}

impl VariantProfile {
    pub const fn kind(&self) -> PrincipalKind {
        match self {
            VariantProfile::Student { .. } => PrincipalKind::Student,
            VariantProfile::Company { .. } => PrincipalKind::Company,
            VariantProfile::Alumni { .. } => PrincipalKind::Alumni,
            VariantProfile::Tpo { .. } => PrincipalKind::Tpo,
        }
    }

    /// The variant's unique identifier besides the email
    pub fn secondary_identifier(&self) -> &str {
        match self {
            VariantProfile::Student {
                enrollment_number, ..
            } => enrollment_number,
            VariantProfile::Company { company_name, .. } => company_name,
            VariantProfile::Alumni {
                enrollment_number, ..
            } => enrollment_number,
            VariantProfile::Tpo { employee_id, .. } => employee_id,
        }
    }
}

/// Non-secret projection of an authenticated entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: Email,
    pub display_name: String,
    pub is_active: bool,
    /// Student and TPO accounts are verified by construction; Company and
    /// Alumni start unverified until a TPO officer flips the flag.
    pub is_verified: bool,
    pub profile: VariantProfile,
    pub created_at_ms: i64,
}

impl Principal {
    /// Build a freshly registered principal
    pub fn new(email: Email, display_name: String, profile: VariantProfile) -> Self {
        let is_verified = !profile.kind().requires_verification();
        Self {
            id: PrincipalId::new(),
            email,
            display_name,
            is_active: true,
            is_verified,
            profile,
            created_at_ms: Utc::now().timestamp_millis(),
        }
    }

    #[inline]
    pub fn kind(&self) -> PrincipalKind {
        self.profile.kind()
    }

    #[inline]
    pub fn secondary_identifier(&self) -> &str {
        self.profile.secondary_identifier()
    }

    pub fn tpo_role(&self) -> Option<TpoRole> {
        match &self.profile {
            VariantProfile::Tpo { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// TPO permission grants; empty for every other variant
    pub fn tpo_permissions(&self) -> &[TpoPermission] {
        match &self.profile {
            VariantProfile::Tpo { permissions, .. } => permissions,
            _ => &[],
        }
    }

    pub fn has_permission(&self, permission: TpoPermission) -> bool {
        self.tpo_permissions().contains(&permission)
    }
}
