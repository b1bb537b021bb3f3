//! HTTP handlers for the session endpoints.
//!
//! | Route            | Guarded | Handler            |
//! |------------------|---------|--------------------|
//! | `GET /v1/login`  | no      | [`login_handler`]  |
//! | `POST /v1/verify`| yes     | [`verify_handler`] |
//! | `GET /v1/logout` | yes     | [`logout_handler`] |

pub mod session;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::{AuthState, require_session};

pub use session::{LoginParams, LoginResponse, login_handler, logout_handler, verify_handler};

/// Builds the session routes with the gate applied to the guarded group.
pub fn router(state: AuthState) -> Router {
    let guarded = Router::new()
        .route("/v1/verify", post(verify_handler))
        .route("/v1/logout", get(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/v1/login", get(login_handler))
        .merge(guarded)
        .with_state(state)
}
