//! Login, verify and logout handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AuthError;
use crate::middleware::{AuthState, Authenticated};

/// Query of `GET /v1/login`.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    /// Identity to issue the session for.
    #[serde(default)]
    pub subject: Option<String>,
}

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The issued token, also set as the session cookie.
    pub access_token: String,
}

/// `GET /v1/login?subject=<s>`
///
/// Issues a session for `subject`, replacing any earlier one, and returns the
/// token both in the body and as the session cookie.
pub async fn login_handler(
    State(state): State<AuthState>,
    Query(params): Query<LoginParams>,
) -> Response {
    let Some(subject) = params.subject.filter(|s| !s.trim().is_empty()) else {
        return AuthError::invalid_request("subject is required").into_response();
    };

    match state.sessions.login(&subject).await {
        Ok(token) => {
            let jar = CookieJar::new().add(state.cookies.issue(&token));
            (
                StatusCode::OK,
                [(CACHE_CONTROL, "no-store")],
                jar,
                Json(LoginResponse {
                    access_token: token.access_token,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /v1/verify`
///
/// The gate does the work; reaching the handler means the session is live.
pub async fn verify_handler(Authenticated(claims): Authenticated) -> Json<serde_json::Value> {
    tracing::debug!(subject = %claims.sub, "session verified");
    Json(json!({}))
}

/// `GET /v1/logout`
///
/// Ends the session of the authenticated subject and clears the cookie.
pub async fn logout_handler(
    State(state): State<AuthState>,
    Authenticated(claims): Authenticated,
) -> Response {
    match state.sessions.logout(&claims.sub).await {
        Ok(()) => {
            let jar = CookieJar::new().add(state.cookies.clear());
            (StatusCode::OK, jar, Json(json!({}))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
