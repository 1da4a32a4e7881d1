//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use uuid::Uuid;

use kernel::id::PrincipalId;
use platform::cookie::{CookieConfig, delete_cookie_header, set_cookie_header};

use crate::application::change_secret::{ChangeSecretInput, ChangeSecretUseCase};
use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::refresh::RefreshUseCase;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::resolve::ResolvedPrincipal;
use crate::application::session::TokenPair;
use crate::application::verification::SetVerificationUseCase;
use crate::domain::entity::VariantProfile;
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::value_object::PrincipalKind;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangeSecretRequest, LoginRequest, MessageResponse, PrincipalResponse, RefreshRequest,
    RegisterAlumniRequest, RegisterCompanyRequest, RegisterStudentRequest, RegisterTpoRequest,
    SessionResponse, TokenPairResponse, VerificationRequest,
};

/// Shared state for auth handlers and middleware
pub struct AuthAppState<R>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: Arc handles clone regardless of R
impl<R> Clone for AuthAppState<R>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Cookie plumbing
// ============================================================================

type SessionCookieHeaders = AppendHeaders<[(header::HeaderName, HeaderValue); 2]>;

fn cookie_config(config: &AuthConfig, name: &str, max_age_secs: i64) -> CookieConfig {
    CookieConfig {
        secure: config.cookie_secure,
        same_site: config.cookie_same_site,
        ..CookieConfig::named(name, max_age_secs)
    }
}

/// Both session cookies for a freshly minted pair
///
/// `AppendHeaders` because plain header tuples insert: the second
/// `Set-Cookie` would silently replace the first.
fn session_cookies(config: &AuthConfig, tokens: &TokenPair) -> SessionCookieHeaders {
    let access = cookie_config(
        config,
        &config.access_cookie_name,
        config.access_ttl.as_secs() as i64,
    );
    let refresh = cookie_config(
        config,
        &config.refresh_cookie_name,
        config.refresh_ttl.as_secs() as i64,
    );
    AppendHeaders([
        (
            header::SET_COOKIE,
            set_cookie_header(&access, &tokens.access_token),
        ),
        (
            header::SET_COOKIE,
            set_cookie_header(&refresh, &tokens.refresh_token),
        ),
    ])
}

/// Expired cookies clearing both token slots
fn clear_cookies(config: &AuthConfig) -> SessionCookieHeaders {
    let access = cookie_config(config, &config.access_cookie_name, 0);
    let refresh = cookie_config(config, &config.refresh_cookie_name, 0);
    AppendHeaders([
        (header::SET_COOKIE, delete_cookie_header(&access)),
        (header::SET_COOKIE, delete_cookie_header(&refresh)),
    ])
}

// ============================================================================
// Login (per variant)
// ============================================================================

async fn login_inner<R>(
    state: AuthAppState<R>,
    kind: PrincipalKind,
    req: LoginRequest,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(
            kind,
            LoginInput {
                identifier: req.identifier,
                secret: req.secret,
            },
        )
        .await?;

    let cookies = session_cookies(&state.config, &output.tokens);
    let body = SessionResponse {
        principal: PrincipalResponse::from(&output.principal),
        access_token: output.tokens.access_token,
        refresh_token: output.tokens.refresh_token,
        access_expires_at_ms: output.tokens.access_expires_at_ms,
    };

    Ok((StatusCode::OK, cookies, Json(body)))
}

/// POST /api/auth/students/login
pub async fn login_student<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    login_inner(state, PrincipalKind::Student, req).await
}

/// POST /api/auth/companies/login
pub async fn login_company<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    login_inner(state, PrincipalKind::Company, req).await
}

/// POST /api/auth/alumni/login
pub async fn login_alumni<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    login_inner(state, PrincipalKind::Alumni, req).await
}

/// POST /api/auth/tpo/login
pub async fn login_tpo<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    login_inner(state, PrincipalKind::Tpo, req).await
}

// ============================================================================
// Registration (per variant)
// ============================================================================

async fn register_inner<R>(
    state: AuthAppState<R>,
    input: RegisterInput,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone());
    let principal = use_case.execute(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(PrincipalResponse::from(&principal)),
    ))
}

/// POST /api/auth/students/register
pub async fn register_student<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterStudentRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    register_inner(
        state,
        RegisterInput {
            email: req.email,
            display_name: req.full_name,
            secret: req.secret,
            profile: VariantProfile::Student {
                enrollment_number: req.enrollment_number,
                branch: req.branch,
                graduation_year: req.graduation_year,
            },
        },
    )
    .await
}

/// POST /api/auth/companies/register
pub async fn register_company<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterCompanyRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    register_inner(
        state,
        RegisterInput {
            email: req.email,
            display_name: req.company_name.clone(),
            secret: req.secret,
            profile: VariantProfile::Company {
                company_name: req.company_name,
                website: req.website,
            },
        },
    )
    .await
}

/// POST /api/auth/alumni/register
pub async fn register_alumni<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterAlumniRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    register_inner(
        state,
        RegisterInput {
            email: req.email,
            display_name: req.full_name,
            secret: req.secret,
            profile: VariantProfile::Alumni {
                enrollment_number: req.enrollment_number,
                graduation_year: req.graduation_year,
                current_company: req.current_company,
            },
        },
    )
    .await
}

/// POST /api/auth/tpo/register
pub async fn register_tpo<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterTpoRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    register_inner(
        state,
        RegisterInput {
            email: req.email,
            display_name: req.full_name,
            secret: req.secret,
            profile: VariantProfile::Tpo {
                employee_id: req.employee_id,
                role: req.role,
                permissions: req.permissions,
            },
        },
    )
    .await
}

// ============================================================================
// Session lifecycle
// ============================================================================

/// POST /api/auth/refresh
///
/// The token is taken from the refresh cookie first, then from the request
/// body as a fallback when cookies are unavailable.
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    // Cookieless clients may send the token in the body instead
    let body_token = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .ok()
            .and_then(|req| req.refresh_token)
    };

    let token = platform::cookie::extract_cookie(&headers, &state.config.refresh_cookie_name)
        .or(body_token)
        .ok_or(AuthError::Unauthenticated)?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.config.clone());
    let tokens = use_case.execute(&token).await?;

    let cookies = session_cookies(&state.config, &tokens);
    let body = TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        access_expires_at_ms: tokens.access_expires_at_ms,
    };

    Ok((StatusCode::OK, cookies, Json(body)))
}

/// POST /api/auth/logout (requires a valid access token)
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    Extension(resolved): Extension<ResolvedPrincipal>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute(resolved.id()).await?;

    Ok((
        StatusCode::OK,
        clear_cookies(&state.config),
        Json(MessageResponse {
            message: "Logged out",
        }),
    ))
}

/// GET /api/auth/me
pub async fn me(
    Extension(resolved): Extension<ResolvedPrincipal>,
) -> AuthResult<Json<PrincipalResponse>> {
    Ok(Json(PrincipalResponse::from(&resolved.principal)))
}

/// POST /api/auth/password
///
/// A successful change clears the stored refresh token and both cookies;
/// every session must log in again.
pub async fn change_secret<R>(
    State(state): State<AuthAppState<R>>,
    Extension(resolved): Extension<ResolvedPrincipal>,
    Json(req): Json<ChangeSecretRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let use_case = ChangeSecretUseCase::new(state.repo.clone());
    use_case
        .execute(
            resolved.id(),
            ChangeSecretInput {
                current_secret: req.current_secret,
                new_secret: req.new_secret,
            },
        )
        .await?;

    Ok((
        StatusCode::OK,
        clear_cookies(&state.config),
        Json(MessageResponse {
            message: "Secret changed, please log in again",
        }),
    ))
}

// ============================================================================
// TPO verification toggles
// ============================================================================

async fn set_verification_inner<R>(
    state: AuthAppState<R>,
    kind: PrincipalKind,
    id: Uuid,
    verified: bool,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let use_case = SetVerificationUseCase::new(state.repo.clone());
    use_case
        .execute(kind, PrincipalId::from_uuid(id), verified)
        .await?;

    Ok(Json(MessageResponse {
        message: "Verification updated",
    }))
}

/// PATCH /api/auth/tpo/companies/{id}/verification
pub async fn set_company_verification<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerificationRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    set_verification_inner(state, PrincipalKind::Company, id, req.verified).await
}

/// PATCH /api/auth/tpo/alumni/{id}/verification
pub async fn set_alumni_verification<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerificationRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    set_verification_inner(state, PrincipalKind::Alumni, id, req.verified).await
}
