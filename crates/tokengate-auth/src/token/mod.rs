//! Session token issuance and validation.
//!
//! - [`SigningKeyPair`]: RSA key material loaded once at startup
//! - [`SessionClaims`]: the registered claim set
//! - [`JwtService`]: RS256 sign and parse
//! - [`Token`]: what a successful login hands back to the caller

pub mod claims;
pub mod jwt;
pub mod keys;

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use claims::{ISSUER, SessionClaims};
pub use jwt::{ALGORITHM, JwtError, JwtService};
pub use keys::SigningKeyPair;

/// Token type reported to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// RFC 6750 bearer token.
    #[default]
    Bearer,
}

impl TokenType {
    /// Returns the wire name of the token type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed access token plus the fields denormalized from its claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Compact JWT.
    pub access_token: String,
    /// Always [`TokenType::Bearer`].
    pub token_type: TokenType,
    /// Seconds until expiry at the time of issue.
    pub expires_in: u64,
    /// Absolute expiry.
    pub expires_at: OffsetDateTime,
    /// Unused.
    pub scope: Option<String>,
}

impl Token {
    /// Wraps a freshly signed token string with its claims.
    #[must_use]
    pub fn new(access_token: String, claims: &SessionClaims) -> Self {
        Self {
            access_token,
            token_type: TokenType::Bearer,
            expires_in: claims.lifetime_secs(),
            expires_at: claims.expires_at(),
            scope: None,
        }
    }
}
