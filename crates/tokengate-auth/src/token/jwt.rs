//! RS256 signing and validation of session tokens.
//!
//! ## Example
//!
//! ```ignore
//! use tokengate_auth::token::{JwtService, SessionClaims, SigningKeyPair};
//!
//! let keys = SigningKeyPair::from_pem_files("private.pem", "public.pem")?;
//! let jwt = JwtService::new(keys);
//!
//! let token = jwt.sign(&SessionClaims::new("alice", lifetime))?;
//! let claims = jwt.parse(&token)?;
//! ```

use std::time::Duration;

use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use time::OffsetDateTime;

use super::claims::{ISSUER, SessionClaims};
use super::keys::SigningKeyPair;
use crate::error::AuthError;

/// The only accepted signature algorithm.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while signing or parsing a token.
///
/// The variants exist for logs. Converting into [`AuthError`] collapses
/// every validation failure into `AuthError::InvalidToken`.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The token is not a well-formed JWT with the expected claims.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the decoding error.
        message: String,
    },

    /// The header names an algorithm other than RS256.
    #[error("Unexpected signing algorithm")]
    UnexpectedAlgorithm,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token was issued after the current time.
    #[error("Token issued in the future")]
    IssuedInFuture,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if the error is a rejection of the presented token.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        !self.is_key_error()
    }

    /// Returns `true` if the error comes from local key material or encoding.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::InvalidKey { .. } | Self::Encoding { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::IssuedInFuture,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::UnexpectedAlgorithm,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::malformed(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        if err.is_key_error() {
            AuthError::signing(err.to_string())
        } else {
            AuthError::InvalidToken
        }
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Signs and validates session tokens with a fixed RS256 key pair.
///
/// This service is `Send + Sync` and is shared behind an `Arc`.
#[derive(Debug)]
pub struct JwtService {
    keys: SigningKeyPair,
    leeway: Duration,
}

impl JwtService {
    /// Creates a service with zero clock skew tolerance.
    #[must_use]
    pub fn new(keys: SigningKeyPair) -> Self {
        Self {
            keys,
            leeway: Duration::ZERO,
        }
    }

    /// Sets the tolerance applied to the `exp` and `iat` checks.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Signs claims into a compact JWT.
    ///
    /// # Errors
    /// Returns `JwtError::Encoding` if serialization or signing fails.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, JwtError> {
        let mut header = Header::new(ALGORITHM);
        header.kid = Some(self.keys.kid().to_string());

        encode(&header, claims, &self.keys.encoding_key)
            .map_err(|e| JwtError::encoding(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    /// Returns a `JwtError` describing the first failed check: algorithm,
    /// signature, structure, issuer, expiry (`exp <= now` is expired) or
    /// issue time (`iat > now`), each widened by the configured leeway.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let leeway = self.leeway.as_secs();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = leeway;

        // Keys were validated at load, so any key complaint here is about the token.
        let claims = decode::<SessionClaims>(token, &self.keys.decoding_key, &validation)
            .map_err(|e| match JwtError::from(e) {
                err if err.is_key_error() => JwtError::malformed(err.to_string()),
                err => err,
            })?
            .claims;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);

        // jsonwebtoken still accepts exp == now - leeway
        if claims.exp <= now.saturating_sub(leeway) {
            return Err(JwtError::Expired);
        }
        if claims.iat > now.saturating_add(leeway) {
            return Err(JwtError::IssuedInFuture);
        }
        if claims.exp <= claims.iat {
            return Err(JwtError::invalid_claims("exp must be after iat"));
        }

        Ok(claims)
    }

    /// Returns the signing key id.
    #[must_use]
    pub fn kid(&self) -> &str {
        self.keys.kid()
    }
}

// ============================================================================
// Tests
// ============================================================================
