//! Integration tests for the auth crate
//!
//! Run the use cases end to end against the in-memory directory.

use std::sync::Arc;

use crate::application::change_secret::{ChangeSecretInput, ChangeSecretUseCase};
use crate::application::config::AuthConfig;
use crate::application::login::{LoginInput, LoginOutput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::refresh::RefreshUseCase;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::resolve::ResolveUseCase;
use crate::domain::entity::{Principal, VariantProfile};
use crate::domain::gate::Gate;
use crate::domain::value_object::{PrincipalKind, TpoPermission, TpoRole};
use crate::error::AuthError;
use crate::infra::memory::InMemoryDirectory;

const SECRET: &str = "correct horse battery";

fn test_config() -> Arc<AuthConfig> {
    Arc::new(AuthConfig::development())
}

async fn register(
    repo: &Arc<InMemoryDirectory>,
    email: &str,
    display_name: &str,
    profile: VariantProfile,
) -> Principal {
    RegisterUseCase::new(repo.clone())
        .execute(RegisterInput {
            email: email.to_string(),
            display_name: display_name.to_string(),
            secret: SECRET.to_string(),
            profile,
        })
        .await
        .expect("registration should succeed")
}

async fn seed_student(repo: &Arc<InMemoryDirectory>) -> Principal {
    register(
        repo,
        "student@campus.edu",
        "Asha Student",
        VariantProfile::Student {
            enrollment_number: "EN2023001".to_string(),
            branch: Some("CSE".to_string()),
            graduation_year: Some(2027),
        },
    )
    .await
}

async fn seed_company(repo: &Arc<InMemoryDirectory>) -> Principal {
    register(
        repo,
        "hr@acme.com",
        "Acme Corp",
        VariantProfile::Company {
            company_name: "Acme Corp".to_string(),
            website: None,
        },
    )
    .await
}

async fn seed_alumni(repo: &Arc<InMemoryDirectory>) -> Principal {
    register(
        repo,
        "alum@campus.edu",
        "Ravi Alum",
        VariantProfile::Alumni {
            enrollment_number: "EN2015042".to_string(),
            graduation_year: Some(2019),
            current_company: Some("Initech".to_string()),
        },
    )
    .await
}

async fn seed_tpo(
    repo: &Arc<InMemoryDirectory>,
    role: TpoRole,
    permissions: Vec<TpoPermission>,
) -> Principal {
    register(
        repo,
        "tpo@campus.edu",
        "Officer Rao",
        VariantProfile::Tpo {
            employee_id: "EMP007".to_string(),
            role,
            permissions,
        },
    )
    .await
}

async fn login(
    repo: &Arc<InMemoryDirectory>,
    config: &Arc<AuthConfig>,
    kind: PrincipalKind,
    identifier: &str,
    secret: &str,
) -> Result<LoginOutput, AuthError> {
    LoginUseCase::new(repo.clone(), config.clone())
        .execute(
            kind,
            LoginInput {
                identifier: identifier.to_string(),
                secret: secret.to_string(),
            },
        )
        .await
}

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_by_email_and_secondary_identifier() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let by_email = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();
        assert_eq!(by_email.principal.id, student.id);

        let by_enrollment = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "EN2023001",
            SECRET,
        )
        .await
        .unwrap();
        assert_eq!(by_enrollment.principal.id, student.id);
    }

    #[tokio::test]
    async fn test_login_is_per_variant() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_student(&repo).await;

        // The student exists, but not in the company collection
        let err = login(
            &repo,
            &config,
            PrincipalKind::Company,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_login_failure_taxonomy() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let unknown = login(&repo, &config, PrincipalKind::Student, "nobody@x.edu", SECRET)
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthError::NotFound));

        let wrong = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            "wrong horse battery",
        )
        .await
        .unwrap_err();
        assert!(matches!(wrong, AuthError::BadCredential));

        // Inactive beats bad credential: valid secret still fails with 403
        repo.set_active(student.id, false);
        let inactive = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap_err();
        assert!(matches!(inactive, AuthError::AccountInactive));
    }

    #[tokio::test]
    async fn test_second_login_invalidates_first_session() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_student(&repo).await;

        let first = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();
        let _second = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        // The first session's refresh token was overwritten by the second
        let err = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&first.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }
}

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_rotation_invalidates_previous_token() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();
        let r1 = session.tokens.refresh_token;

        let use_case = RefreshUseCase::new(repo.clone(), config.clone());

        let pair2 = use_case.execute(&r1).await.unwrap();
        assert_ne!(pair2.refresh_token, r1);

        // Replaying the rotated-away token is a hard generic failure
        let replay = use_case.execute(&r1).await.unwrap_err();
        assert!(matches!(replay, AuthError::Unauthenticated));

        // The freshly rotated token still works
        use_case.execute(&pair2.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_invalidates_all_prior_tokens() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        LogoutUseCase::new(repo.clone())
            .execute(student.id)
            .await
            .unwrap();

        let err = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_malformed_and_wrong_kind_tokens_rejected() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        let use_case = RefreshUseCase::new(repo.clone(), config.clone());

        let garbage = use_case.execute("not.a.token").await.unwrap_err();
        assert!(matches!(garbage, AuthError::Unauthenticated));

        // An access token presented to refresh fails the same generic way
        let wrong_kind = use_case
            .execute(&session.tokens.access_token)
            .await
            .unwrap_err();
        assert!(matches!(wrong_kind, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_refresh_rejects_deactivated_account() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        repo.set_active(student.id, false);

        let err = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));
    }
}

mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_returns_the_owning_variant() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();

        let student = seed_student(&repo).await;
        let company = seed_company(&repo).await;
        let alum = seed_alumni(&repo).await;
        let tpo = seed_tpo(&repo, TpoRole::Admin, vec![TpoPermission::ManageTpo]).await;

        let resolve = ResolveUseCase::new(repo.clone(), config.clone());
        let codec = config.codec();

        for (principal, kind) in [
            (&student, PrincipalKind::Student),
            (&company, PrincipalKind::Company),
            (&alum, PrincipalKind::Alumni),
            (&tpo, PrincipalKind::Tpo),
        ] {
            let token = codec
                .issue(
                    crate::domain::token::TokenKind::Access,
                    principal.id.into_uuid(),
                    kind,
                    Default::default(),
                    60_000,
                )
                .unwrap();

            let resolved = resolve.execute(&token).await.unwrap();
            assert_eq!(resolved.kind(), kind);
            assert_eq!(resolved.id(), principal.id);
        }
    }

    #[tokio::test]
    async fn test_resolve_fails_for_deleted_record() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        // The token outlives the record; resolution must fail generically
        repo.remove(student.id);

        let err = ResolveUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_resolve_rejects_expired_and_foreign_tokens() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let resolve = ResolveUseCase::new(repo.clone(), config.clone());
        let codec = config.codec();

        let expired = codec
            .issue(
                crate::domain::token::TokenKind::Access,
                student.id.into_uuid(),
                PrincipalKind::Student,
                Default::default(),
                0,
            )
            .unwrap();
        let err = resolve.execute(&expired).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));

        // A refresh token is not an access token
        let refresh_token = codec
            .issue(
                crate::domain::token::TokenKind::Refresh,
                student.id.into_uuid(),
                PrincipalKind::Student,
                Default::default(),
                60_000,
            )
            .unwrap();
        let err = resolve.execute(&refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));

        // A token signed under a different deployment's secrets
        let foreign = AuthConfig::development()
            .codec()
            .issue(
                crate::domain::token::TokenKind::Access,
                student.id.into_uuid(),
                PrincipalKind::Student,
                Default::default(),
                60_000,
            )
            .unwrap();
        let err = resolve.execute(&foreign).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_resolve_rejects_inactive_before_any_gate() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        repo.set_active(student.id, false);

        let err = ResolveUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountInactive));
    }
}

mod register_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_identifiers_conflict() {
        let repo = Arc::new(InMemoryDirectory::new());
        seed_student(&repo).await;

        let use_case = RegisterUseCase::new(repo.clone());

        let same_email = use_case
            .execute(RegisterInput {
                email: "student@campus.edu".to_string(),
                display_name: "Other".to_string(),
                secret: SECRET.to_string(),
                profile: VariantProfile::Student {
                    enrollment_number: "EN9999999".to_string(),
                    branch: None,
                    graduation_year: None,
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(same_email, AuthError::IdentifierTaken));

        let same_enrollment = use_case
            .execute(RegisterInput {
                email: "other@campus.edu".to_string(),
                display_name: "Other".to_string(),
                secret: SECRET.to_string(),
                profile: VariantProfile::Student {
                    enrollment_number: "EN2023001".to_string(),
                    branch: None,
                    graduation_year: None,
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(same_enrollment, AuthError::IdentifierTaken));
    }

    #[tokio::test]
    async fn test_policy_violating_secret_rejected() {
        let repo = Arc::new(InMemoryDirectory::new());
        let err = RegisterUseCase::new(repo.clone())
            .execute(RegisterInput {
                email: "weak@campus.edu".to_string(),
                display_name: "Weak".to_string(),
                secret: "short".to_string(),
                profile: VariantProfile::Student {
                    enrollment_number: "EN1".to_string(),
                    branch: None,
                    graduation_year: None,
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_verification_lifecycle() {
        use crate::application::verification::SetVerificationUseCase;

        let repo = Arc::new(InMemoryDirectory::new());
        let company = seed_company(&repo).await;
        assert!(!company.is_verified);

        let use_case = SetVerificationUseCase::new(repo.clone());

        use_case
            .execute(PrincipalKind::Company, company.id, true)
            .await
            .unwrap();

        let reloaded = crate::domain::repository::PrincipalRepository::find_by_id(
            repo.as_ref(),
            PrincipalKind::Company,
            company.id,
        )
        .await
        .unwrap()
        .unwrap();
        assert!(reloaded.is_verified);

        // Students carry no verification flag
        let student = seed_student(&repo).await;
        let err = use_case
            .execute(PrincipalKind::Student, student.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        // Unknown id
        let missing = use_case
            .execute(PrincipalKind::Company, kernel::id::PrincipalId::new(), true)
            .await
            .unwrap_err();
        assert!(matches!(missing, AuthError::NotFound));
    }
}

mod change_secret_tests {
    use super::*;

    #[tokio::test]
    async fn test_change_secret_rotates_hash_and_clears_session() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        let student = seed_student(&repo).await;

        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        let use_case = ChangeSecretUseCase::new(repo.clone());

        let wrong = use_case
            .execute(
                student.id,
                ChangeSecretInput {
                    current_secret: "wrong horse battery".to_string(),
                    new_secret: "brand new secret 42".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::BadCredential));

        use_case
            .execute(
                student.id,
                ChangeSecretInput {
                    current_secret: SECRET.to_string(),
                    new_secret: "brand new secret 42".to_string(),
                },
            )
            .await
            .unwrap();

        // Old secret no longer works, the new one does
        let old = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap_err();
        assert!(matches!(old, AuthError::BadCredential));

        login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            "brand new secret 42",
        )
        .await
        .unwrap();

        // The pre-change session was force-logged-out
        let err = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }
}

mod http_tests {
    use super::*;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    use platform::rate_limit::RateLimitConfig;

    use crate::presentation::admission::AdmissionConfig;
    use crate::presentation::router::auth_router_generic;

    fn router_with(admission: AdmissionConfig) -> Router {
        auth_router_generic(
            InMemoryDirectory::new(),
            AuthConfig::development(),
            admission,
        )
    }

    fn test_router() -> Router {
        router_with(AdmissionConfig::default())
    }

    async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookie_values(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    async fn register_student_http(router: &Router, email: &str, enrollment: &str) {
        let response = post_json(
            router,
            "/students/register",
            serde_json::json!({
                "email": email,
                "enrollmentNumber": enrollment,
                "fullName": "Asha Student",
                "secret": SECRET,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    async fn login_student_http(router: &Router, identifier: &str) -> serde_json::Value {
        let response = post_json(
            router,
            "/students/login",
            serde_json::json!({ "identifier": identifier, "secret": SECRET }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_login_sets_both_session_cookies() {
        let router = test_router();
        register_student_http(&router, "student@campus.edu", "EN2023001").await;

        let response = post_json(
            &router,
            "/students/login",
            serde_json::json!({ "identifier": "student@campus.edu", "secret": SECRET }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookie_values(&response);
        assert_eq!(cookies.len(), 2, "both token cookies must be set");
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
        for cookie in &cookies {
            assert!(cookie.contains("HttpOnly"), "cookie not HttpOnly: {cookie}");
        }
    }

    #[tokio::test]
    async fn test_logout_clears_both_cookies() {
        let router = test_router();
        register_student_http(&router, "student@campus.edu", "EN2023001").await;
        let session = login_student_http(&router, "student@campus.edu").await;
        let access = session["accessToken"].as_str().unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .header(header::AUTHORIZATION, format!("Bearer {access}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookie_values(&response);
        assert_eq!(cookies.len(), 2);
        assert!(
            cookies
                .iter()
                .any(|c| c.starts_with("accessToken=;") && c.contains("Max-Age=0"))
        );
        assert!(
            cookies
                .iter()
                .any(|c| c.starts_with("refreshToken=;") && c.contains("Max-Age=0"))
        );
    }

    #[tokio::test]
    async fn test_bearer_header_wins_over_cookie() {
        let router = test_router();
        register_student_http(&router, "first@campus.edu", "EN2023001").await;
        register_student_http(&router, "second@campus.edu", "EN2023002").await;

        let first = login_student_http(&router, "first@campus.edu").await;
        let second = login_student_http(&router, "second@campus.edu").await;

        let bearer = first["accessToken"].as_str().unwrap();
        let cookie_token = second["accessToken"].as_str().unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
                    .header(header::COOKIE, format!("accessToken={cookie_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["email"], "first@campus.edu");
    }

    #[tokio::test]
    async fn test_refresh_accepts_cookie_or_body_token() {
        let router = test_router();
        register_student_http(&router, "student@campus.edu", "EN2023001").await;
        let session = login_student_http(&router, "student@campus.edu").await;
        let refresh_token = session["refreshToken"].as_str().unwrap();

        // Cookieless client: token travels in the body
        let response = post_json(
            &router,
            "/refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = json_body(response).await;
        let rotated_token = rotated["refreshToken"].as_str().unwrap();
        assert_ne!(rotated_token, refresh_token);

        // Cookie client with the rotated token
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/refresh")
                    .header(header::COOKIE, format!("refreshToken={rotated_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // No cookie, no body
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_quota_exhaustion_returns_429_with_headers() {
        let router = router_with(AdmissionConfig {
            login: RateLimitConfig::new(1, 3600),
            ..Default::default()
        });

        let attempt = serde_json::json!({ "identifier": "nobody@x.edu", "secret": SECRET });

        let first = post_json(&router, "/students/login", attempt.clone()).await;
        assert_ne!(first.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(first.headers()["x-ratelimit-limit"], "1");
        assert_eq!(first.headers()["x-ratelimit-remaining"], "0");

        let second = post_json(&router, "/students/login", attempt).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers()["x-ratelimit-remaining"], "0");
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        assert!(second.headers().contains_key("x-ratelimit-reset"));

        // Admission is per category: registration is still open
        let register = post_json(
            &router,
            "/students/register",
            serde_json::json!({
                "email": "student@campus.edu",
                "enrollmentNumber": "EN2023001",
                "fullName": "Asha Student",
                "secret": SECRET,
            }),
        )
        .await;
        assert_eq!(register.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_verification_toggle_requires_permission() {
        let router = test_router();

        let response = post_json(
            &router,
            "/tpo/register",
            serde_json::json!({
                "email": "tpo@campus.edu",
                "employeeId": "EMP007",
                "fullName": "Officer Rao",
                "role": "coordinator",
                "permissions": ["manage_students"],
                "secret": SECRET,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = post_json(
            &router,
            "/companies/register",
            serde_json::json!({
                "email": "hr@acme.com",
                "companyName": "Acme Corp",
                "secret": SECRET,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let company = json_body(response).await;
        let company_id = company["principalId"].as_str().unwrap().to_string();

        let session = post_json(
            &router,
            "/tpo/login",
            serde_json::json!({ "identifier": "EMP007", "secret": SECRET }),
        )
        .await;
        assert_eq!(session.status(), StatusCode::OK);
        let session = json_body(session).await;
        let access = session["accessToken"].as_str().unwrap();

        // manage_students does not grant company verification
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/tpo/companies/{company_id}/verification"))
                    .header(header::AUTHORIZATION, format!("Bearer {access}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"verified":true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

mod end_to_end_tests {
    use super::*;

    /// The §8 scenario: student logs in, hits a company-only gate, refreshes,
    /// then replays the original refresh token.
    #[tokio::test]
    async fn test_student_session_scenario() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_student(&repo).await;

        // Login with valid credentials
        let session = login(
            &repo,
            &config,
            PrincipalKind::Student,
            "student@campus.edu",
            SECRET,
        )
        .await
        .unwrap();

        // A company-only endpoint rejects the student's resolved identity
        let resolved = ResolveUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.access_token)
            .await
            .unwrap();
        let company_only = Gate::new().kinds(&[PrincipalKind::Company]);
        assert!(matches!(
            company_only.check(&resolved.principal),
            Err(AuthError::WrongPrincipalType)
        ));

        // Refresh succeeds and rotates
        let pair = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.refresh_token)
            .await
            .unwrap();

        // Replaying the original refresh token fails generically
        let replay = RefreshUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(replay, AuthError::Unauthenticated));

        // The rotated pair keeps the session alive
        ResolveUseCase::new(repo.clone(), config.clone())
            .execute(&pair.access_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_coordinator_without_manage_tpo_is_rejected_end_to_end() {
        let repo = Arc::new(InMemoryDirectory::new());
        let config = test_config();
        seed_tpo(
            &repo,
            TpoRole::Coordinator,
            vec![TpoPermission::ManageStudents, TpoPermission::ViewAnalytics],
        )
        .await;

        let session = login(&repo, &config, PrincipalKind::Tpo, "EMP007", SECRET)
            .await
            .unwrap();

        let resolved = ResolveUseCase::new(repo.clone(), config.clone())
            .execute(&session.tokens.access_token)
            .await
            .unwrap();

        let gate = Gate::new()
            .kinds(&[PrincipalKind::Tpo])
            .permissions(&[TpoPermission::ManageTpo]);
        assert!(matches!(
            gate.check(&resolved.principal),
            Err(AuthError::InsufficientPermission)
        ));
    }
}
