//! PostgreSQL Repository Implementation
//!
//! The credential store: an identity index table (`principal_index`) maps
//! id → variant tag in O(1); the four variant tables hold the non-secret
//! projections; `credentials` holds the secret hash and the single current
//! refresh token per principal.

use sqlx::PgPool;
use uuid::Uuid;

use kernel::id::PrincipalId;
use platform::secret::HashedSecret;

use crate::domain::entity::{Credential, Principal, VariantProfile};
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::value_object::{Email, PrincipalKind, TpoPermission, TpoRole};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed principal directory and credential store
#[derive(Clone)]
pub struct PgPrincipalRepository {
    pool: PgPool,
}

impl PgPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct StudentRow {
    principal_id: Uuid,
    email: String,
    enrollment_number: String,
    full_name: String,
    branch: Option<String>,
    graduation_year: Option<i16>,
    is_active: bool,
    created_at_ms: i64,
}

impl StudentRow {
    fn into_principal(self) -> Principal {
        Principal {
            id: PrincipalId::from_uuid(self.principal_id),
            email: Email::from_db(self.email),
            display_name: self.full_name,
            is_active: self.is_active,
            is_verified: true,
            profile: VariantProfile::Student {
                enrollment_number: self.enrollment_number,
                branch: self.branch,
                graduation_year: self.graduation_year,
            },
            created_at_ms: self.created_at_ms,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    principal_id: Uuid,
    email: String,
    company_name: String,
    website: Option<String>,
    is_active: bool,
    is_verified: bool,
    created_at_ms: i64,
}

impl CompanyRow {
    fn into_principal(self) -> Principal {
        Principal {
            id: PrincipalId::from_uuid(self.principal_id),
            email: Email::from_db(self.email),
            display_name: self.company_name.clone(),
            is_active: self.is_active,
            is_verified: self.is_verified,
            profile: VariantProfile::Company {
                company_name: self.company_name,
                website: self.website,
            },
            created_at_ms: self.created_at_ms,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AlumniRow {
    principal_id: Uuid,
    email: String,
    enrollment_number: String,
    full_name: String,
    graduation_year: Option<i16>,
    current_company: Option<String>,
    is_active: bool,
    is_verified: bool,
    created_at_ms: i64,
}

impl AlumniRow {
    fn into_principal(self) -> Principal {
        Principal {
            id: PrincipalId::from_uuid(self.principal_id),
            email: Email::from_db(self.email),
            display_name: self.full_name,
            is_active: self.is_active,
            is_verified: self.is_verified,
            profile: VariantProfile::Alumni {
                enrollment_number: self.enrollment_number,
                graduation_year: self.graduation_year,
                current_company: self.current_company,
            },
            created_at_ms: self.created_at_ms,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TpoRow {
    principal_id: Uuid,
    email: String,
    employee_id: String,
    full_name: String,
    role: i16,
    permissions: Vec<String>,
    is_active: bool,
    created_at_ms: i64,
}

impl TpoRow {
    fn into_principal(self) -> AuthResult<Principal> {
        let role = TpoRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown TPO role id {}", self.role)))?;

        let permissions = self
            .permissions
            .iter()
            .map(|code| {
                TpoPermission::from_code(code)
                    .ok_or_else(|| AuthError::Internal(format!("Unknown permission code {code}")))
            })
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(Principal {
            id: PrincipalId::from_uuid(self.principal_id),
            email: Email::from_db(self.email),
            display_name: self.full_name,
            is_active: self.is_active,
            is_verified: true,
            profile: VariantProfile::Tpo {
                employee_id: self.employee_id,
                role,
                permissions,
            },
            created_at_ms: self.created_at_ms,
        })
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl PrincipalRepository for PgPrincipalRepository {
    async fn kind_of(&self, id: PrincipalId) -> AuthResult<Option<PrincipalKind>> {
        let row = sqlx::query_scalar::<_, i16>(
            "SELECT kind FROM principal_index WHERE principal_id = $1",
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(kind_id) => PrincipalKind::from_id(kind_id)
                .map(Some)
                .ok_or_else(|| AuthError::Internal(format!("Unknown kind id {kind_id} in index"))),
            None => Ok(None),
        }
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
    ) -> AuthResult<Option<Principal>> {
        let uuid = id.into_uuid();

        match kind {
            PrincipalKind::Student => {
                let row = sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT principal_id, email, enrollment_number, full_name,
                           branch, graduation_year, is_active, created_at_ms
                    FROM students WHERE principal_id = $1
                    "#,
                )
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(StudentRow::into_principal))
            }
            PrincipalKind::Company => {
                let row = sqlx::query_as::<_, CompanyRow>(
                    r#"
                    SELECT principal_id, email, company_name, website,
                           is_active, is_verified, created_at_ms
                    FROM companies WHERE principal_id = $1
                    "#,
                )
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(CompanyRow::into_principal))
            }
            PrincipalKind::Alumni => {
                let row = sqlx::query_as::<_, AlumniRow>(
                    r#"
                    SELECT principal_id, email, enrollment_number, full_name,
                           graduation_year, current_company, is_active,
                           is_verified, created_at_ms
                    FROM alumni WHERE principal_id = $1
                    "#,
                )
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(AlumniRow::into_principal))
            }
            PrincipalKind::Tpo => {
                let row = sqlx::query_as::<_, TpoRow>(
                    r#"
                    SELECT principal_id, email, employee_id, full_name,
                           role, permissions, is_active, created_at_ms
                    FROM tpo_officers WHERE principal_id = $1
                    "#,
                )
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
                row.map(TpoRow::into_principal).transpose()
            }
        }
    }

    async fn find_by_identifier(
        &self,
        kind: PrincipalKind,
        identifier: &str,
    ) -> AuthResult<Option<Principal>> {
        match kind {
            PrincipalKind::Student => {
                let row = sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT principal_id, email, enrollment_number, full_name,
                           branch, graduation_year, is_active, created_at_ms
                    FROM students
                    WHERE email = lower($1) OR enrollment_number = $1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(StudentRow::into_principal))
            }
            PrincipalKind::Company => {
                let row = sqlx::query_as::<_, CompanyRow>(
                    r#"
                    SELECT principal_id, email, company_name, website,
                           is_active, is_verified, created_at_ms
                    FROM companies
                    WHERE email = lower($1) OR company_name = $1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(CompanyRow::into_principal))
            }
            PrincipalKind::Alumni => {
                let row = sqlx::query_as::<_, AlumniRow>(
                    r#"
                    SELECT principal_id, email, enrollment_number, full_name,
                           graduation_year, current_company, is_active,
                           is_verified, created_at_ms
                    FROM alumni
                    WHERE email = lower($1) OR enrollment_number = $1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(AlumniRow::into_principal))
            }
            PrincipalKind::Tpo => {
                let row = sqlx::query_as::<_, TpoRow>(
                    r#"
                    SELECT principal_id, email, employee_id, full_name,
                           role, permissions, is_active, created_at_ms
                    FROM tpo_officers
                    WHERE email = lower($1) OR employee_id = $1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
                row.map(TpoRow::into_principal).transpose()
            }
        }
    }

    async fn create(&self, principal: &Principal, credential: &Credential) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;
        let uuid = principal.id.into_uuid();
        let kind = principal.kind();

        // The index primary key asserts cross-variant id uniqueness rather
        // than silently relying on UUID construction.
        sqlx::query("INSERT INTO principal_index (principal_id, kind) VALUES ($1, $2)")
            .bind(uuid)
            .bind(kind.id())
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        let variant_insert = match &principal.profile {
            VariantProfile::Student {
                enrollment_number,
                branch,
                graduation_year,
            } => sqlx::query(
                r#"
                INSERT INTO students (
                    principal_id, email, enrollment_number, full_name,
                    branch, graduation_year, is_active, created_at_ms
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(uuid)
            .bind(principal.email.as_str())
            .bind(enrollment_number)
            .bind(&principal.display_name)
            .bind(branch)
            .bind(*graduation_year)
            .bind(principal.is_active)
            .bind(principal.created_at_ms),
            VariantProfile::Company {
                company_name,
                website,
            } => sqlx::query(
                r#"
                INSERT INTO companies (
                    principal_id, email, company_name, website,
                    is_active, is_verified, created_at_ms
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(uuid)
            .bind(principal.email.as_str())
            .bind(company_name)
            .bind(website)
            .bind(principal.is_active)
            .bind(principal.is_verified)
            .bind(principal.created_at_ms),
            VariantProfile::Alumni {
                enrollment_number,
                graduation_year,
                current_company,
            } => sqlx::query(
                r#"
                INSERT INTO alumni (
                    principal_id, email, enrollment_number, full_name,
                    graduation_year, current_company, is_active,
                    is_verified, created_at_ms
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(uuid)
            .bind(principal.email.as_str())
            .bind(enrollment_number)
            .bind(&principal.display_name)
            .bind(*graduation_year)
            .bind(current_company)
            .bind(principal.is_active)
            .bind(principal.is_verified)
            .bind(principal.created_at_ms),
            VariantProfile::Tpo {
                employee_id,
                role,
                permissions,
            } => {
                let codes: Vec<String> =
                    permissions.iter().map(|p| p.code().to_string()).collect();
                sqlx::query(
                    r#"
                    INSERT INTO tpo_officers (
                        principal_id, email, employee_id, full_name,
                        role, permissions, is_active, created_at_ms
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(uuid)
                .bind(principal.email.as_str())
                .bind(employee_id)
                .bind(&principal.display_name)
                .bind(role.id())
                .bind(codes)
                .bind(principal.is_active)
                .bind(principal.created_at_ms)
            }
        };

        variant_insert
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        sqlx::query(
            r#"
            INSERT INTO credentials (principal_id, secret_hash, current_refresh_token)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(uuid)
        .bind(credential.secret_hash.as_phc_string())
        .bind(&credential.current_refresh_token)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(principal_id = %principal.id, kind = %kind, "Principal persisted");

        Ok(())
    }

    async fn set_verified(
        &self,
        kind: PrincipalKind,
        id: PrincipalId,
        verified: bool,
    ) -> AuthResult<bool> {
        let query = match kind {
            PrincipalKind::Company => {
                "UPDATE companies SET is_verified = $2 WHERE principal_id = $1"
            }
            PrincipalKind::Alumni => "UPDATE alumni SET is_verified = $2 WHERE principal_id = $1",
            // Student and TPO carry no verification flag
            _ => return Ok(false),
        };

        let affected = sqlx::query(query)
            .bind(id.into_uuid())
            .bind(verified)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

impl CredentialRepository for PgPrincipalRepository {
    async fn find_credential(&self, id: PrincipalId) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT secret_hash, current_refresh_token FROM credentials WHERE principal_id = $1",
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((hash, current_refresh_token)) => {
                let secret_hash = HashedSecret::from_phc_string(hash)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                Ok(Some(Credential {
                    principal_id: id,
                    secret_hash,
                    current_refresh_token,
                }))
            }
            None => Ok(None),
        }
    }

    async fn update_secret_hash(&self, id: PrincipalId, hash: &HashedSecret) -> AuthResult<()> {
        let affected =
            sqlx::query("UPDATE credentials SET secret_hash = $2 WHERE principal_id = $1")
                .bind(id.into_uuid())
                .bind(hash.as_phc_string())
                .execute(&self.pool)
                .await?
                .rows_affected();

        if affected == 0 {
            return Err(AuthError::Unauthenticated);
        }
        Ok(())
    }

    async fn store_refresh_token(&self, id: PrincipalId, token: &str) -> AuthResult<()> {
        let affected = sqlx::query(
            "UPDATE credentials SET current_refresh_token = $2 WHERE principal_id = $1",
        )
        .bind(id.into_uuid())
        .bind(token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AuthError::Unauthenticated);
        }
        Ok(())
    }

    async fn clear_refresh_token(&self, id: PrincipalId) -> AuthResult<()> {
        sqlx::query("UPDATE credentials SET current_refresh_token = NULL WHERE principal_id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Map PostgreSQL unique violations to the conflict error; the pre-check in
/// the register use case loses races, the constraint does not.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return AuthError::IdentifierTaken;
        }
    }
    AuthError::Database(err)
}
