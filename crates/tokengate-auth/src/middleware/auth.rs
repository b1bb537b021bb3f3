//! Request authentication gate.
//!
//! The gate runs in four steps:
//!
//! 1. Pull a candidate token from the first carrier in [`CARRIERS`] that
//!    yields a non-empty value, or reject with `MissingToken`.
//! 2. Parse it cryptographically.
//! 3. Check it is the live session of its subject.
//! 4. Hand the claims to the handler.
//!
//! Any rejection also clears the session cookie on the client.
//!
//! Claims reach a handler only through its signature: [`Authenticated`] on
//! routes behind [`require_session`], or [`SessionAuth`] on routes that gate
//! themselves. The request extension is just the slot between the middleware
//! and `Authenticated`; nothing else reads it.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::post};
//! use tokengate_auth::middleware::{AuthState, Authenticated, require_session};
//!
//! async fn whoami(Authenticated(claims): Authenticated) -> String {
//!     claims.sub
//! }
//!
//! let app = Router::new()
//!     .route("/v1/whoami", post(whoami))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
//!     .with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::cookie::{CookieConfig, append_set_cookie};
use crate::error::AuthError;
use crate::session::SessionService;
use crate::token::SessionClaims;
use crate::AuthResult;

// =============================================================================
// Auth State
// =============================================================================

/// State shared by the gate and the session handlers.
#[derive(Clone)]
pub struct AuthState {
    /// Session lifecycle.
    pub sessions: SessionService,

    /// Session cookie attributes.
    pub cookies: Arc<CookieConfig>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(sessions: SessionService, cookies: CookieConfig) -> Self {
        Self {
            sessions,
            cookies: Arc::new(cookies),
        }
    }
}

// =============================================================================
// Carriers
// =============================================================================

/// Pulls a raw token candidate out of a request.
pub type TokenCarrier = fn(&HeaderMap, &CookieConfig) -> Option<String>;

/// Carriers in precedence order.
pub const CARRIERS: &[TokenCarrier] = &[bearer_from_header, token_from_cookie];

/// Reads `Authorization: Bearer <token>`. The scheme is case-insensitive.
pub fn bearer_from_header(headers: &HeaderMap, _: &CookieConfig) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    if value.len() <= 7 || value.as_bytes()[6] != b' ' {
        return None;
    }
    let scheme = value.get(..6)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    value.get(7..).map(ToString::to_string)
}

/// Reads the session cookie.
pub fn token_from_cookie(headers: &HeaderMap, cookies: &CookieConfig) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(&cookies.name)
        .map(|cookie| cookie.value().to_string())
}

/// Returns the first non-blank candidate, trimmed.
#[must_use]
pub fn extract_token(headers: &HeaderMap, cookies: &CookieConfig) -> Option<String> {
    CARRIERS.iter().find_map(|carrier| {
        carrier(headers, cookies)
            .map(|raw| raw.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

// =============================================================================
// Gate
// =============================================================================

/// Decides whether a request carries a live session.
///
/// # Errors
///
/// `MissingToken` if no carrier yields a token, otherwise whatever
/// [`SessionService::authenticate`] returns.
pub async fn authenticate(state: &AuthState, headers: &HeaderMap) -> AuthResult<SessionClaims> {
    let token = extract_token(headers, &state.cookies).ok_or(AuthError::MissingToken)?;
    state.sessions.authenticate(&token).await
}

/// Turns a gate failure into a response that also clears the session cookie.
#[must_use]
pub fn reject(cookies: &CookieConfig, error: AuthError) -> Response {
    let mut response = error.into_response();
    append_set_cookie(response.headers_mut(), &cookies.clear());
    response
}

/// Middleware guarding a route group.
///
/// On success the claims are stored in the request extensions for
/// [`Authenticated`] to pick up.
pub async fn require_session(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(claims) => {
            tracing::debug!(subject = %claims.sub, "request authenticated");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(error) => {
            tracing::debug!(error = %error, "request rejected");
            reject(&state.cookies, error)
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Claims of a request that passed [`require_session`].
///
/// Rejects with `MissingContext` when used on a route the middleware does
/// not guard.
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionClaims);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(Self)
            .ok_or(AuthError::MissingContext)
    }
}

/// Runs the whole gate as an extractor, for routes without the middleware.
#[derive(Debug, Clone)]
pub struct SessionAuth(pub SessionClaims);

impl<S> FromRequestParts<S> for SessionAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AuthState::from_ref(state);
        authenticate(&state, &parts.headers)
            .await
            .map(Self)
            .map_err(|error| {
                tracing::debug!(error = %error, "request rejected");
                reject(&state.cookies, error)
            })
    }
}
