//! Admission Control Middleware
//!
//! Fixed-window rate limiting keyed by (client IP, route category). Runs
//! before any token verification so credential-stuffing traffic is rejected
//! at the cheapest possible point. Counters are process-local; a
//! multi-instance deployment gets per-instance quotas.

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use platform::client::extract_client_ip;
use platform::rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitResult};

use crate::error::AuthError;

/// Route categories with independently configured quotas. Exhausting one
/// category never affects another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    Login,
    Registration,
    SecretChange,
    /// Declared here for resource-layer bulk endpoints; this crate only
    /// carries its quota configuration.
    Bulk,
    Generic,
}

impl RouteCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::Login => "login",
            RouteCategory::Registration => "registration",
            RouteCategory::SecretChange => "secret_change",
            RouteCategory::Bulk => "bulk",
            RouteCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category quota configuration
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub login: RateLimitConfig,
    pub registration: RateLimitConfig,
    pub secret_change: RateLimitConfig,
    pub bulk: RateLimitConfig,
    pub generic: RateLimitConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            login: RateLimitConfig::new(10, 15 * 60),
            registration: RateLimitConfig::new(5, 3600),
            secret_change: RateLimitConfig::new(5, 3600),
            bulk: RateLimitConfig::new(20, 3600),
            generic: RateLimitConfig::new(100, 15 * 60),
        }
    }
}

impl AdmissionConfig {
    pub fn for_category(&self, category: RouteCategory) -> &RateLimitConfig {
        match category {
            RouteCategory::Login => &self.login,
            RouteCategory::Registration => &self.registration,
            RouteCategory::SecretChange => &self.secret_change,
            RouteCategory::Bulk => &self.bulk,
            RouteCategory::Generic => &self.generic,
        }
    }
}

/// Shared limiter plus configuration, cloned into every admission layer
#[derive(Debug, Clone, Default)]
pub struct AdmissionState {
    limiter: Arc<FixedWindowLimiter>,
    config: Arc<AdmissionConfig>,
}

impl AdmissionState {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            limiter: Arc::new(FixedWindowLimiter::new()),
            config: Arc::new(config),
        }
    }

    /// Check and count one request for (client, category)
    pub fn check(&self, client_key: &str, category: RouteCategory) -> RateLimitResult {
        let key = format!("{client_key}:{category}");
        self.limiter.check(&key, self.config.for_category(category))
    }
}

/// Middleware entry point. State carries the shared limiter and the route's
/// category.
pub async fn admit(
    State((state, category)): State<(AdmissionState, RouteCategory)>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client_key = extract_client_ip(req.headers(), direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let result = state.check(&client_key, category);

    if !result.allowed {
        let now_ms = Utc::now().timestamp_millis();
        let err = AuthError::QuotaExceeded {
            retry_after_secs: result.retry_after_secs(now_ms),
        };
        let mut response = err.into_response();
        apply_quota_headers(&mut response, &result);
        return response;
    }

    let mut response = next.run(req).await;
    apply_quota_headers(&mut response, &result);
    response
}

/// Standard quota headers on every categorized response
fn apply_quota_headers(response: &mut Response, result: &RateLimitResult) {
    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&result.limit.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", v);
    }
    // Reset is reported as epoch seconds
    if let Ok(v) = HeaderValue::from_str(&(result.reset_at_ms / 1000).to_string()) {
        headers.insert("x-ratelimit-reset", v);
    }
}
