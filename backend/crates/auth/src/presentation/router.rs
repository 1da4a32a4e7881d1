//! Auth Router
//!
//! Wires the HTTP surface under `/api/auth`. Layer order per route is
//! admission control (outermost) → principal resolution → gate enforcement
//! → handler; admission always runs before any token work.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::application::config::AuthConfig;
use crate::domain::gate::Gate;
use crate::domain::repository::{CredentialRepository, PrincipalRepository};
use crate::domain::value_object::{PrincipalKind, TpoPermission};
use crate::infra::postgres::PgPrincipalRepository;
use crate::presentation::admission::{self, AdmissionConfig, AdmissionState, RouteCategory};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{enforce_gate, require_principal};

/// Create the auth router with the PostgreSQL repository
pub fn auth_router(
    repo: PgPrincipalRepository,
    config: AuthConfig,
    admission: AdmissionConfig,
) -> Router {
    auth_router_generic(repo, config, admission)
}

/// Create a generic auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig, admission: AdmissionConfig) -> Router
where
    R: PrincipalRepository + CredentialRepository + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };
    let admission = AdmissionState::new(admission);

    let admit = |category: RouteCategory| {
        middleware::from_fn_with_state((admission.clone(), category), admission::admit)
    };

    let login_routes = Router::new()
        .route("/students/login", post(handlers::login_student::<R>))
        .route("/companies/login", post(handlers::login_company::<R>))
        .route("/alumni/login", post(handlers::login_alumni::<R>))
        .route("/tpo/login", post(handlers::login_tpo::<R>))
        .route_layer(admit(RouteCategory::Login))
        .with_state(state.clone());

    let register_routes = Router::new()
        .route("/students/register", post(handlers::register_student::<R>))
        .route("/companies/register", post(handlers::register_company::<R>))
        .route("/alumni/register", post(handlers::register_alumni::<R>))
        .route("/tpo/register", post(handlers::register_tpo::<R>))
        .route_layer(admit(RouteCategory::Registration))
        .with_state(state.clone());

    let refresh_routes = Router::new()
        .route("/refresh", post(handlers::refresh::<R>))
        .route_layer(admit(RouteCategory::Generic))
        .with_state(state.clone());

    let session_routes = Router::new()
        .route("/logout", post(handlers::logout::<R>))
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal::<R>,
        ))
        .route_layer(admit(RouteCategory::Generic))
        .with_state(state.clone());

    let password_routes = Router::new()
        .route("/password", post(handlers::change_secret::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal::<R>,
        ))
        .route_layer(admit(RouteCategory::SecretChange))
        .with_state(state.clone());

    // Verification toggles: TPO only, each guarded by its own permission
    let company_gate = Gate::new()
        .kinds(&[PrincipalKind::Tpo])
        .permissions(&[TpoPermission::ManageCompanies]);
    let alumni_gate = Gate::new()
        .kinds(&[PrincipalKind::Tpo])
        .permissions(&[TpoPermission::ManageAlumni]);

    let tpo_routes = Router::new()
        .route(
            "/tpo/companies/{id}/verification",
            patch(handlers::set_company_verification::<R>)
                .route_layer(middleware::from_fn_with_state(company_gate, enforce_gate)),
        )
        .route(
            "/tpo/alumni/{id}/verification",
            patch(handlers::set_alumni_verification::<R>)
                .route_layer(middleware::from_fn_with_state(alumni_gate, enforce_gate)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal::<R>,
        ))
        .route_layer(admit(RouteCategory::Generic))
        .with_state(state);

    Router::new()
        .merge(login_routes)
        .merge(register_routes)
        .merge(refresh_routes)
        .merge(session_routes)
        .merge(password_routes)
        .merge(tpo_routes)
}
