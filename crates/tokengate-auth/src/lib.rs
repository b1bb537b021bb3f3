//! # tokengate-auth
//!
//! Short-lived bearer sessions with single-session-per-subject revocation.
//!
//! A login signs an RS256 token for a subject and stores it as that subject's
//! only live session. A request is authenticated when its token both parses
//! and equals the stored session, so a newer login or a logout revokes every
//! earlier token for the subject.
//!
//! ## Modules
//!
//! - [`config`] - Token lifetime, cookie and key material settings
//! - [`token`] - Key pair, claims and RS256 sign/parse
//! - [`storage`] - Session store trait with Redis and in-memory backends
//! - [`session`] - Login, logout and verification
//! - [`cookie`] - Session cookie attributes
//! - [`middleware`] - Axum gate, extractors and error responses
//! - [`http`] - Session endpoint handlers

pub mod config;
pub mod cookie;
pub mod error;
pub mod http;
pub mod middleware;
pub mod session;
pub mod storage;
pub mod token;

pub use config::{AuthConfig, ConfigError, CookieSettings, KeyConfig};
pub use cookie::CookieConfig;
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthState, Authenticated, SessionAuth, require_session};
pub use session::SessionService;
pub use storage::{
    MemorySessionStore, RedisSessionStore, SessionRecord, SessionStore, session_key,
};
pub use token::{ISSUER, JwtError, JwtService, SessionClaims, SigningKeyPair, Token, TokenType};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
