//! Session cookie attributes.
//!
//! Production cookies are `HttpOnly; Secure; SameSite=Strict; Path=/` with
//! no domain. Local development drops `Secure`, relaxes to `SameSite=Lax`
//! and scopes the cookie to `localhost` so it survives plain HTTP.

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use cookie::{Cookie, SameSite};
use time::OffsetDateTime;

use crate::config::AuthConfig;
use crate::token::Token;

/// Value written into a cleared cookie.
pub const CLEARED_VALUE: &str = "deleted";

/// Attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,
    /// `Secure` attribute.
    pub secure: bool,
    /// `HttpOnly` attribute.
    pub http_only: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute.
    pub domain: Option<String>,
}

impl CookieConfig {
    /// Attributes for deployments behind TLS.
    #[must_use]
    pub fn production(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            domain: None,
        }
    }

    /// Attributes for local development over plain HTTP.
    #[must_use]
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
            domain: Some("localhost".to_string()),
            ..Self::production(name)
        }
    }

    /// Picks production or local attributes from configuration.
    #[must_use]
    pub fn from_auth_config(config: &AuthConfig) -> Self {
        if config.local_dev {
            Self::local(config.cookie.name.clone())
        } else {
            Self::production(config.cookie.name.clone())
        }
    }

    /// Builds the cookie carrying `token`, expiring with it.
    #[must_use]
    pub fn issue(&self, token: &Token) -> Cookie<'static> {
        self.build(token.access_token.clone(), token.expires_at)
    }

    /// Builds a cookie that makes the client drop the session cookie.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = self.build(CLEARED_VALUE.to_string(), OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(time::Duration::ZERO);
        cookie
    }

    fn build(&self, value: String, expires: OffsetDateTime) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .expires(expires);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}

/// Appends `cookie` as a `Set-Cookie` header.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.encoded().to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "cookie is not a valid header value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SessionClaims;
    use std::time::Duration;

    fn token() -> Token {
        let claims = SessionClaims::new("alice", Duration::from_secs(1200));
        Token::new("a.b.c".to_string(), &claims)
    }

    #[test]
    fn test_production_cookie() {
        let token = token();
        let cookie = CookieConfig::production("token").issue(&token);

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.expires_datetime(), Some(token.expires_at));
    }

    #[test]
    fn test_local_cookie() {
        let cookie = CookieConfig::local("token").issue(&token());

        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.domain(), Some("localhost"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = CookieConfig::production("token").clear();

        assert_eq!(cookie.value(), CLEARED_VALUE);
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_from_auth_config() {
        let mut config = AuthConfig::default();
        config.cookie.name = "session".to_string();
        assert_eq!(
            CookieConfig::from_auth_config(&config),
            CookieConfig::production("session")
        );

        config.local_dev = true;
        assert_eq!(
            CookieConfig::from_auth_config(&config),
            CookieConfig::local("session")
        );
    }

    #[test]
    fn test_append_set_cookie() {
        let mut headers = HeaderMap::new();
        append_set_cookie(&mut headers, &CookieConfig::production("token").clear());

        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("token=deleted"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
    }
}
