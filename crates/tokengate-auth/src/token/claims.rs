//! Registered claim set carried by session tokens.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Issuer written into and required from every token.
pub const ISSUER: &str = "jwt-server";

/// Claims of a session token.
///
/// Timestamps are Unix seconds. `jti` only makes two tokens minted for the
/// same subject in the same second distinct; it is not checked on parse and
/// may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer. Must equal [`ISSUER`].
    pub iss: String,

    /// Subject the token was issued for.
    pub sub: String,

    /// Issued at.
    pub iat: i64,

    /// Expires at.
    pub exp: i64,

    /// Token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl SessionClaims {
    /// Builds claims for `subject` issued now and valid for `lifetime`.
    #[must_use]
    pub fn new(subject: impl Into<String>, lifetime: Duration) -> Self {
        Self::issued_at(subject, lifetime, OffsetDateTime::now_utc())
    }

    /// Builds claims for `subject` issued at `now` and valid for `lifetime`.
    ///
    /// Sub-second precision of both arguments is dropped.
    #[must_use]
    pub fn issued_at(subject: impl Into<String>, lifetime: Duration, now: OffsetDateTime) -> Self {
        let iat = now.unix_timestamp();
        let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

        Self {
            iss: ISSUER.to_string(),
            sub: subject.into(),
            iat,
            exp: iat.saturating_add(lifetime),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Returns the issued-at time.
    #[must_use]
    pub fn issued_at_time(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.iat).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Returns the expiry time.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Returns the validity window in whole seconds.
    #[must_use]
    pub fn lifetime_secs(&self) -> u64 {
        u64::try_from(self.exp.saturating_sub(self.iat)).unwrap_or(0)
    }
}
