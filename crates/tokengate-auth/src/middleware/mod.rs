//! Axum integration of the authentication gate.
//!
//! - [`require_session`] middleware guarding a route group
//! - [`Authenticated`] extractor reading the claims the middleware stored
//! - [`SessionAuth`] extractor running the gate on its own
//! - `IntoResponse` for [`AuthError`](crate::AuthError)

pub mod auth;
pub mod error;

pub use auth::{
    AuthState, Authenticated, CARRIERS, SessionAuth, TokenCarrier, authenticate,
    bearer_from_header, extract_token, reject, require_session, token_from_cookie,
};
pub use error::{ErrorBody, GENERIC_SERVER_ERROR, status_code};
