//! Session store abstraction and its backends.
//!
//! The store holds at most one record per subject under
//! [`session_key`]`(subject)`. The record is the token most recently issued
//! for that subject. Expiry is enforced by the store itself.
//!
//! # Implementations
//!
//! - [`RedisSessionStore`] - shared store for multi-instance deployments
//! - [`MemorySessionStore`] - process-local store for single instances and tests

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

/// Prefix of every session key.
pub const SESSION_KEY_PREFIX: &str = "auth_";

/// Returns the store key holding the session of `subject`.
#[must_use]
pub fn session_key(subject: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{subject}")
}

/// Persisted value of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The live token for the subject.
    #[serde(rename = "AccessToken")]
    pub access_token: String,
}

impl SessionRecord {
    /// Creates a record for a freshly issued token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

/// Key-value store with per-key expiry holding session records.
///
/// Each call is its own unit of atomicity. There is no compare-and-swap, so
/// concurrent writes to one key resolve last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `record` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the write fails.
    async fn set(&self, key: &str, record: &SessionRecord, ttl: Duration) -> AuthResult<()>;

    /// Fetches the record stored under `key`.
    ///
    /// Returns `Ok(None)` for absent or expired keys.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the read fails or the stored value
    /// cannot be decoded.
    async fn get(&self, key: &str) -> AuthResult<Option<SessionRecord>>;

    /// Deletes the given keys and returns how many existed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the delete fails.
    async fn delete(&self, keys: &[&str]) -> AuthResult<u64>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if it is not.
    async fn ping(&self) -> AuthResult<()> {
        Ok(())
    }
}
