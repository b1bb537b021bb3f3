//! Error response handling for the authentication gate and handlers.
//!
//! Errors render as `{"code": "...", "description": "..."}`. Server-side
//! descriptions are logged and replaced with a generic message before they
//! leave the process.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Description sent in place of any 5xx detail.
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong, please try again later";

/// Realm advertised in `WWW-Authenticate`.
const REALM: &str = "tokengate";

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let code = self.code();

        let description = if status.is_server_error() {
            tracing::error!(
                code = code,
                category = %self.category(),
                error = %self,
                "request failed"
            );
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        };

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(code, &description);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        let body = ErrorBody {
            code: code.to_string(),
            description,
        };
        (status, headers, Json(body)).into_response()
    }
}

/// Returns the HTTP status for an error.
#[must_use]
pub fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::Storage { .. }
        | AuthError::Signing { .. }
        | AuthError::MissingContext
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="tokengate", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"{}\", error=\"{}\", error_description=\"{}\"",
        REALM, error, escaped_desc
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> ErrorBody {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_response() {
        let response = AuthError::MissingToken.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(www_auth.contains("realm=\"tokengate\""));
        assert!(www_auth.contains("error=\"missing_token\""));

        let body = body_of(response).await;
        assert_eq!(body.code, "missing_token");
        assert_eq!(body.description, "Missing access token");
    }

    #[tokio::test]
    async fn test_invalid_token_response() {
        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_of(response).await;
        assert_eq!(body.code, "invalid_token");
        assert_eq!(body.description, "Invalid access token");
    }

    #[tokio::test]
    async fn test_server_errors_are_masked() {
        let response = AuthError::storage("redis://10.0.0.3 refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

        let body = body_of(response).await;
        assert_eq!(body.code, "redis");
        assert_eq!(body.description, GENERIC_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_context_response() {
        let response = AuthError::MissingContext.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.code, "missing_auth_context");
    }

    #[tokio::test]
    async fn test_client_errors_pass_through() {
        let response = AuthError::invalid_request("subject is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await.description,
            "Invalid request: subject is required"
        );
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("invalid_token", "Token contains \"quotes\"");
        assert!(header.contains("\\\"quotes\\\""));
    }
}
