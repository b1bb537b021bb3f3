//! Tokengate HTTP server: configuration, store wiring and the axum app.

pub mod config;
pub mod observability;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokengate_auth::{
    AuthState, CookieConfig, JwtService, MemorySessionStore, RedisSessionStore, SessionService,
    SessionStore, SigningKeyPair,
};

pub use config::AppConfig;
pub use server::{ServerBuilder, TokengateServer, build_app};

use crate::config::RedisConfig;

/// Creates the session store for the given configuration.
///
/// With Redis disabled, sessions are kept in process memory. Otherwise the
/// pool is created and a connection is checked out once; failing to reach
/// Redis is fatal.
pub async fn create_session_store(config: &RedisConfig) -> anyhow::Result<Arc<dyn SessionStore>> {
    if !config.enabled {
        tracing::warn!("Redis disabled, sessions are kept in process memory only");
        return Ok(Arc::new(MemorySessionStore::new()));
    }

    tracing::info!(url = %config.redacted_url(), "Connecting to Redis");

    let timeout = Duration::from_millis(config.timeout_ms);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);
    pool_config.timeouts.recycle = Some(timeout);

    let mut redis_config = deadpool_redis::Config::from_url(config.connection_url());
    redis_config.pool = Some(pool_config);

    let pool = redis_config
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .context("failed to create Redis pool")?;

    let store = RedisSessionStore::new(pool);
    store
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to Redis: {e}"))?;

    tracing::info!("Connected to Redis");
    Ok(Arc::new(store))
}

/// Loads the signing keys and wires the session service, store and cookie
/// policy into the state shared by the handlers.
pub async fn build_auth_state(config: &AppConfig) -> anyhow::Result<AuthState> {
    let keys = SigningKeyPair::from_config(&config.auth.keys).context("failed to load signing keys")?;
    tracing::info!(kid = %keys.kid(), "Signing keys loaded");

    let jwt = Arc::new(JwtService::new(keys).with_leeway(config.auth.clock_skew_leeway));
    let store = create_session_store(&config.redis).await?;
    let sessions = SessionService::new(jwt, store, config.auth.token_lifetime);

    if config.auth.local_dev {
        tracing::warn!("Local development mode: session cookie is not marked Secure");
    }

    Ok(AuthState::new(sessions, CookieConfig::from_auth_config(&config.auth)))
}

/// Startup banner with the effective settings.
pub fn banner(config: &AppConfig) -> String {
    let store = if config.redis.enabled {
        config.redis.redacted_url()
    } else {
        "memory".to_string()
    };
    format!(
        "tokengate v{}\n  listen:   {}\n  store:    {}\n  lifetime: {}s\n  cookie:   {}",
        env!("CARGO_PKG_VERSION"),
        config.addr(),
        store,
        config.auth.token_lifetime.as_secs(),
        config.auth.cookie.name,
    )
}
