//! Auth Middleware
//!
//! `require_principal` turns a bearer/cookie access token into a
//! [`ResolvedPrincipal`] request extension; `enforce_gate` applies a
//! route's [`Gate`] to it. Layer order on a route is admission →
//! require_principal → enforce_gate.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use platform::client::extract_bearer_token;
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::resolve::{ResolveUseCase, ResolvedPrincipal};
use crate::domain::gate::Gate;
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Access token from `Authorization: Bearer` or the access cookie; the
/// header wins when both are present. Header form is access-token only.
pub fn extract_access_token(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, &config.access_cookie_name))
}

/// Middleware that resolves the caller's identity or rejects with 401
pub async fn require_principal<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let token = extract_access_token(req.headers(), &state.config)
        .ok_or_else(|| AuthError::Unauthenticated.into_response())?;

    let use_case = ResolveUseCase::new(state.repo.clone(), state.config.clone());

    match use_case.execute(&token).await {
        Ok(resolved) => {
            req.extensions_mut().insert(resolved);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Middleware applying a route's gate to the already-resolved principal
pub async fn enforce_gate(
    State(gate): State<Gate>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let resolved = req
        .extensions()
        .get::<ResolvedPrincipal>()
        .ok_or_else(|| AuthError::Unauthenticated.into_response())?;

    gate.check(&resolved.principal)
        .map_err(|e| e.into_response())?;

    Ok(next.run(req).await)
}
