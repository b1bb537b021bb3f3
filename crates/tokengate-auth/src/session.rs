//! Session lifecycle: login, logout and request-time verification.
//!
//! A subject has at most one live session. Login overwrites the stored token,
//! so any earlier token for the same subject stops verifying even though it
//! still parses. Two concurrent logins race at the store and the last write
//! wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::storage::{SessionRecord, SessionStore, session_key};
use crate::token::{JwtService, SessionClaims, Token};
use crate::{AuthError, AuthResult};

/// Issues, verifies and revokes session tokens.
#[derive(Clone)]
pub struct SessionService {
    jwt: Arc<JwtService>,
    store: Arc<dyn SessionStore>,
    lifetime: Duration,
}

impl SessionService {
    /// Creates a service issuing tokens valid for `lifetime`.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, store: Arc<dyn SessionStore>, lifetime: Duration) -> Self {
        Self {
            jwt,
            store,
            lifetime,
        }
    }

    /// Issues a token for `subject` and makes it the subject's only live session.
    ///
    /// The token is only returned once it is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if signing fails and `AuthError::Storage`
    /// if the session cannot be stored.
    pub async fn login(&self, subject: &str) -> AuthResult<Token> {
        let started = Instant::now();
        let claims = SessionClaims::new(subject, self.lifetime);

        // RSA signing is CPU-bound
        let jwt = Arc::clone(&self.jwt);
        let to_sign = claims.clone();
        let access_token = tokio::task::spawn_blocking(move || jwt.sign(&to_sign))
            .await
            .map_err(|e| AuthError::internal(format!("signing task failed: {e}")))??;

        self.store
            .set(
                &session_key(subject),
                &SessionRecord::new(access_token.clone()),
                self.lifetime,
            )
            .await?;

        tracing::info!(
            subject = %subject,
            duration_ms = started.elapsed().as_millis() as u64,
            "session issued"
        );
        Ok(Token::new(access_token, &claims))
    }

    /// Ends the session of `subject`. Succeeds if there is none.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails, or if the session was
    /// present but the delete removed nothing.
    pub async fn logout(&self, subject: &str) -> AuthResult<()> {
        let started = Instant::now();
        let key = session_key(subject);

        if self.store.get(&key).await?.is_none() {
            tracing::debug!(subject = %subject, "logout without live session");
            return Ok(());
        }

        let deleted = self.store.delete(&[key.as_str()]).await?;
        if deleted < 1 {
            return Err(AuthError::storage(format!(
                "session for '{subject}' vanished during logout"
            )));
        }

        tracing::info!(
            subject = %subject,
            duration_ms = started.elapsed().as_millis() as u64,
            "session ended"
        );
        Ok(())
    }

    /// Cryptographically validates `token` without consulting the store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any rejected token.
    pub fn parse_token(&self, token: &str) -> AuthResult<SessionClaims> {
        self.jwt.parse(token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::from(e)
        })
    }

    /// Checks that `token` is the live session of `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if there is no session or it holds a
    /// different token, and `AuthError::Storage` if the store fails.
    pub async fn verify_token(&self, token: &str, subject: &str) -> AuthResult<()> {
        match self.store.get(&session_key(subject)).await? {
            Some(record) if record.access_token == token => Ok(()),
            Some(_) => {
                tracing::debug!(subject = %subject, "token superseded by a newer session");
                Err(AuthError::InvalidToken)
            }
            None => {
                tracing::debug!(subject = %subject, "no live session");
                Err(AuthError::InvalidToken)
            }
        }
    }

    /// Parses `token` and checks it against the live session of its subject.
    ///
    /// # Errors
    ///
    /// Propagates the error of whichever step fails.
    pub async fn authenticate(&self, token: &str) -> AuthResult<SessionClaims> {
        let claims = self.parse_token(token)?;
        self.verify_token(token, &claims.sub).await?;
        Ok(claims)
    }

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if it is not.
    pub async fn ping(&self) -> AuthResult<()> {
        self.store.ping().await
    }
}
