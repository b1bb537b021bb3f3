//! Session authentication error types.
//!
//! Every failure on the request path collapses into one of these variants
//! before it reaches a client. The issuer keeps a richer [`JwtError`] for
//! logging, but clients only ever see [`AuthError::InvalidToken`] for any
//! token that did not pass validation.
//!
//! [`JwtError`]: crate::token::JwtError

use std::fmt;

/// Errors produced by the token lifecycle and the authentication gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token was presented on any carrier.
    #[error("Missing access token")]
    MissingToken,

    /// The token is malformed, forged, expired, from another issuer, or
    /// no longer matches the live session for its subject.
    #[error("Invalid access token")]
    InvalidToken,

    /// The session store is unreachable or returned inconsistent data.
    #[error("Session store error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// Key material is unusable or token encoding failed.
    #[error("Signing error: {message}")]
    Signing {
        /// Description of the signing error.
        message: String,
    },

    /// Claims were requested from a request that never passed the gate.
    #[error("Missing auth context")]
    MissingContext,

    /// The HTTP request itself is malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Signing` error.
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::InvalidToken | Self::InvalidRequest { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingToken | Self::InvalidToken => ErrorCategory::Token,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Signing { .. } => ErrorCategory::KeyMaterial,
            Self::MissingContext | Self::Internal { .. } => ErrorCategory::Internal,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
        }
    }

    /// Returns the machine-readable code sent in error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::Storage { .. } => "redis",
            Self::Signing { .. } => "jwt",
            Self::MissingContext => "missing_auth_context",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Categories of authentication errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or rejected credentials.
    Token,
    /// Request validation errors.
    Validation,
    /// Session store failures.
    Infrastructure,
    /// Signing key or encoding failures.
    KeyMaterial,
    /// Programming errors and other internal failures.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::KeyMaterial => write!(f, "key_material"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::MissingToken.to_string(), "Missing access token");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid access token");
        assert_eq!(
            AuthError::storage("connection refused").to_string(),
            "Session store error: connection refused"
        );
        assert_eq!(
            AuthError::MissingContext.to_string(),
            "Missing auth context"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::MissingToken.is_client_error());
        assert!(AuthError::InvalidToken.is_client_error());
        assert!(AuthError::invalid_request("no subject").is_client_error());

        assert!(AuthError::storage("down").is_server_error());
        assert!(AuthError::signing("bad key").is_server_error());
        assert!(AuthError::MissingContext.is_server_error());
        assert!(AuthError::internal("boom").is_server_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::MissingToken.code(), "missing_token");
        assert_eq!(AuthError::InvalidToken.code(), "invalid_token");
        assert_eq!(AuthError::storage("x").code(), "redis");
        assert_eq!(AuthError::signing("x").code(), "jwt");
        assert_eq!(AuthError::MissingContext.code(), "missing_auth_context");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(AuthError::InvalidToken.category(), ErrorCategory::Token);
        assert_eq!(
            AuthError::storage("x").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::signing("x").category(),
            ErrorCategory::KeyMaterial
        );
        assert_eq!(ErrorCategory::KeyMaterial.to_string(), "key_material");
    }
}
