//! Session authentication configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! token_lifetime = "20m"
//! clock_skew_leeway = "0s"
//! local_dev = false
//!
//! [auth.cookie]
//! name = "token"
//!
//! [auth.keys]
//! private_key_path = "/etc/tokengate/signing.pem"
//! public_key_path = "/etc/tokengate/signing.pub.pem"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default lifetime of an issued token and of its session record.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(20 * 60);

/// Root configuration for the token lifecycle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Validity window of issued tokens. Also the session record TTL.
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,

    /// Tolerance applied to the `exp` and `iat` checks.
    /// Zero means strict comparison against the local clock.
    #[serde(with = "humantime_serde")]
    pub clock_skew_leeway: Duration,

    /// Relaxed cookie attributes for local development over plain HTTP.
    pub local_dev: bool,

    /// Session cookie settings.
    pub cookie: CookieSettings,

    /// Signing key material.
    pub keys: KeyConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            clock_skew_leeway: Duration::ZERO,
            local_dev: false,
            cookie: CookieSettings::default(),
            keys: KeyConfig::default(),
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieSettings {
    /// Name of the cookie carrying the access token.
    pub name: String,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "token".to_string(),
        }
    }
}

/// RSA key material, either inline PEM or file paths.
///
/// For each half of the pair the inline PEM wins when non-empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Path to the PEM encoded RSA private key.
    pub private_key_path: Option<PathBuf>,

    /// Path to the PEM encoded RSA public key.
    pub public_key_path: Option<PathBuf>,

    /// Inline PEM encoded RSA private key.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,

    /// Inline PEM encoded RSA public key.
    pub public_key: Option<String>,
}

/// Where one half of the key pair comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource<'a> {
    /// Inline PEM text.
    Pem(&'a str),
    /// PEM file on disk.
    File(&'a PathBuf),
}

impl KeyConfig {
    /// Resolves the private key source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if neither the inline key nor the path is set.
    pub fn private_source(&self) -> Result<KeySource<'_>, ConfigError> {
        Self::source(
            self.private_key.as_deref(),
            self.private_key_path.as_ref(),
            "private_key_path or private_key",
        )
    }

    /// Resolves the public key source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if neither the inline key nor the path is set.
    pub fn public_source(&self) -> Result<KeySource<'_>, ConfigError> {
        Self::source(
            self.public_key.as_deref(),
            self.public_key_path.as_ref(),
            "public_key_path or public_key",
        )
    }

    fn source<'a>(
        pem: Option<&'a str>,
        path: Option<&'a PathBuf>,
        what: &str,
    ) -> Result<KeySource<'a>, ConfigError> {
        match (pem.filter(|p| !p.trim().is_empty()), path) {
            (Some(pem), _) => Ok(KeySource::Pem(pem)),
            (None, Some(path)) if !path.as_os_str().is_empty() => Ok(KeySource::File(path)),
            _ => Err(ConfigError::Missing(format!("auth.keys.{what}"))),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the token lifetime is under one
    /// second or the cookie name is empty, and `ConfigError::Missing` if either half of the
    /// key pair has no source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_lifetime.as_secs() == 0 {
            return Err(ConfigError::InvalidValue(
                "token_lifetime must be at least one second".to_string(),
            ));
        }

        if self.cookie.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "cookie name cannot be empty".to_string(),
            ));
        }

        self.keys.private_source()?;
        self.keys.public_source()?;

        Ok(())
    }
}
