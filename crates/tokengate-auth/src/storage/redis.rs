//! Redis session store over a `deadpool-redis` pool.
//!
//! Records are stored as JSON strings with `SET key value EX ttl`. Calls are
//! never retried; a pool or command failure surfaces as `AuthError::Storage`.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;

use super::{SessionRecord, SessionStore};
use crate::{AuthError, AuthResult};

/// [`SessionStore`] backed by Redis.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AuthResult<Connection> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to get Redis connection");
            AuthError::storage(format!("connection: {e}"))
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(&self, key: &str, record: &SessionRecord, ttl: Duration) -> AuthResult<()> {
        let value = serde_json::to_string(record)
            .map_err(|e| AuthError::storage(format!("encode session: {e}")))?;
        // EX 0 is rejected by Redis
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Redis SET error");
                AuthError::storage(format!("SET: {e}"))
            })?;

        tracing::debug!(key = %key, ttl_secs = %ttl_secs, "session stored (redis)");
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<SessionRecord>> {
        let mut conn = self.connection().await?;
        let value = conn.get::<_, Option<String>>(key).await.map_err(|e| {
            tracing::warn!(key = %key, error = %e, "Redis GET error");
            AuthError::storage(format!("GET: {e}"))
        })?;

        value
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    tracing::warn!(key = %key, error = %e, "Undecodable session value");
                    AuthError::storage(format!("decode session: {e}"))
                })
            })
            .transpose()
    }

    async fn delete(&self, keys: &[&str]) -> AuthResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection().await?;
        conn.del::<_, u64>(keys).await.map_err(|e| {
            tracing::warn!(keys = ?keys, error = %e, "Redis DEL error");
            AuthError::storage(format!("DEL: {e}"))
        })
    }

    async fn ping(&self) -> AuthResult<()> {
        self.connection().await.map(|_| ())
    }
}
