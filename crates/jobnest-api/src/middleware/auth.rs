//! Request authentication gate.
//!
//! The gate never rejects a request. It only decides whether a principal is
//! attached; handlers that need one use the `CurrentUser` extractor.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use jobnest_entity::account::AccountStatus;
use jobnest_service::context::Principal;

use crate::state::AppState;

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RoutePattern {
    /// The path must equal this string.
    Exact(String),
    /// The path equals this string or continues it with `/`.
    Prefix(String),
    /// Segment-by-segment match with the same segment count.
    Segments(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Numeric,
}

impl RoutePattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            Self::Segments(segments) => {
                let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
                parts.len() == segments.len()
                    && parts.iter().zip(segments).all(|(part, seg)| match seg {
                        Segment::Literal(lit) => part == lit,
                        Segment::Numeric => {
                            !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
                        }
                    })
            }
        }
    }
}

/// Static allow-list of paths admitted without authentication.
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    patterns: Vec<RoutePattern>,
}

impl PublicRoutes {
    /// Empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The JobNest allow-list.
    pub fn jobnest() -> Self {
        Self::new()
            .exact("/api/auth/login")
            .exact("/api/auth/register")
            .exact("/api/auth/refresh")
            .exact("/api/health")
            .prefix("/api/auth/google")
            .prefix("/swagger-ui")
            .prefix("/v3/api-docs")
            .prefix("/api/jobs")
            .prefix("/api/companies")
            .pattern("/api/employers/{id}/jobs")
    }

    /// Adds an exact path.
    pub fn exact(mut self, path: &str) -> Self {
        self.patterns.push(RoutePattern::Exact(path.to_string()));
        self
    }

    /// Adds a path prefix, matched on segment boundaries.
    pub fn prefix(mut self, path: &str) -> Self {
        self.patterns
            .push(RoutePattern::Prefix(path.trim_end_matches('/').to_string()));
        self
    }

    /// Adds a segment pattern; `{name}` segments match a numeric id.
    pub fn pattern(mut self, pattern: &str) -> Self {
        let segments = pattern
            .trim_matches('/')
            .split('/')
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    Segment::Numeric
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();
        self.patterns.push(RoutePattern::Segments(segments));
        self
    }

    /// Whether `path` is admitted without authentication.
    pub fn is_public(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the principal for a bearer token, if any.
async fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Option<Principal> {
    let token = bearer_token(headers)?;

    let claims = match state.decoder.verify_access(token) {
        Ok(claims) => claims,
        Err(_) => {
            debug!("Bearer token rejected; continuing unauthenticated");
            return None;
        }
    };

    let account = match state.accounts.find_by_email(&claims.email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            debug!(account_id = %claims.sub, "Token subject no longer exists");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Account lookup failed in authentication gate");
            return None;
        }
    };

    if account.status != AccountStatus::Active {
        debug!(account_id = %account.id, status = %account.status, "Inactive account not admitted");
        return None;
    }

    Some(Principal::from_account(&account))
}

/// Attaches a [`Principal`] to requests carrying a valid access token.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if !state.public_routes.is_public(request.uri().path()) {
        if let Some(principal) = resolve_principal(&state, request.headers()).await {
            request.extensions_mut().insert(principal);
        }
    }
    next.run(request).await
}
