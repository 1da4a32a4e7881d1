//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::Principal;
use crate::domain::value_object::{PrincipalKind, TpoPermission, TpoRole};

/// Request for the per-variant login endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email or the variant's secondary identifier
    pub identifier: String,
    pub secret: String,
}

/// Request for POST /students/register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    pub email: String,
    pub enrollment_number: String,
    pub full_name: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i16>,
    pub secret: String,
}

/// Request for POST /companies/register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyRequest {
    pub email: String,
    pub company_name: String,
    #[serde(default)]
    pub website: Option<String>,
    pub secret: String,
}

/// Request for POST /alumni/register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAlumniRequest {
    pub email: String,
    pub enrollment_number: String,
    pub full_name: String,
    #[serde(default)]
    pub graduation_year: Option<i16>,
    #[serde(default)]
    pub current_company: Option<String>,
    pub secret: String,
}

/// Request for POST /tpo/register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTpoRequest {
    pub email: String,
    pub employee_id: String,
    pub full_name: String,
    pub role: TpoRole,
    #[serde(default)]
    pub permissions: Vec<TpoPermission>,
    pub secret: String,
}

/// Request body fallback for POST /refresh when cookies are unavailable
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Request for POST /password
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSecretRequest {
    pub current_secret: String,
    pub new_secret: String,
}

/// Request for the verification toggle endpoints
#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub verified: bool,
}

/// Non-secret principal projection; the hash and stored refresh token never
/// appear here by construction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub principal_id: Uuid,
    pub kind: PrincipalKind,
    pub email: String,
    pub display_name: String,
    pub secondary_identifier: String,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<TpoRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<TpoPermission>>,
    pub created_at_ms: i64,
}

impl From<&Principal> for PrincipalResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            principal_id: principal.id.into_uuid(),
            kind: principal.kind(),
            email: principal.email.as_str().to_string(),
            display_name: principal.display_name.clone(),
            secondary_identifier: principal.secondary_identifier().to_string(),
            is_active: principal.is_active,
            is_verified: principal.is_verified,
            role: principal.tpo_role(),
            permissions: match principal.kind() {
                PrincipalKind::Tpo => Some(principal.tpo_permissions().to_vec()),
                _ => None,
            },
            created_at_ms: principal.created_at_ms,
        }
    }
}

/// Response for the login endpoints; tokens also travel as cookies
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub principal: PrincipalResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at_ms: i64,
}

/// Response for POST /refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at_ms: i64,
}

/// Generic acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
