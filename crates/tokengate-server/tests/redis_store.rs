//! Integration tests for the Redis session store.
//!
//! These tests use testcontainers to spin up a real Redis instance and are
//! ignored by default. Run with `--ignored` where Docker is available.

use std::sync::Arc;
use std::time::Duration;

use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tokengate_auth::{
    AuthError, JwtService, SessionRecord, SessionService, SessionStore, SigningKeyPair,
    session_key,
};
use tokengate_server::config::RedisConfig;
use tokengate_server::create_session_store;
use tokio::sync::OnceCell;

const PRIVATE_PEM: &str = include_str!("../../tokengate-auth/tests/fixtures/signing_private.pem");
const PUBLIC_PEM: &str = include_str!("../../tokengate-auth/tests/fixtures/signing_public.pem");

// Shared Redis container for all tests
static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, u16)> = OnceCell::const_new();

async fn redis_port() -> u16 {
    let (_, port) = SHARED_REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("start redis container");
            let port = container.get_host_port_ipv4(6379).await.expect("get port");
            (container, port)
        })
        .await;
    *port
}

async fn redis_config() -> RedisConfig {
    RedisConfig {
        scheme: String::new(),
        host: "127.0.0.1".to_string(),
        port: Some(redis_port().await),
        ..RedisConfig::default()
    }
}

async fn store() -> Arc<dyn SessionStore> {
    create_session_store(&redis_config().await)
        .await
        .expect("connect to redis")
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn set_get_delete_round_trip() {
    let store = store().await;
    let key = session_key("round-trip");

    store
        .set(&key, &SessionRecord::new("abc"), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some(SessionRecord::new("abc"))
    );

    assert_eq!(store.delete(&[key.as_str()]).await.unwrap(), 1);
    assert_eq!(store.get(&key).await.unwrap(), None);
    assert_eq!(store.delete(&[key.as_str()]).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn record_is_stored_as_json_with_ttl() {
    let cfg = redis_config().await;
    let store = store().await;
    let key = session_key("wire-format");

    store
        .set(&key, &SessionRecord::new("tok"), Duration::from_secs(30))
        .await
        .unwrap();

    let client = redis::Client::open(cfg.connection_url()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let raw: String = redis::cmd("GET")
        .arg(&key)
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(raw, r#"{"AccessToken":"tok"}"#);

    let ttl: i64 = redis::cmd("TTL")
        .arg(&key)
        .query_async(&mut conn)
        .await
        .unwrap();
    assert!((1..=30).contains(&ttl), "ttl = {ttl}");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn record_expires() {
    let store = store().await;
    let key = session_key("expiring");

    store
        .set(&key, &SessionRecord::new("tok"), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(store.get(&key).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn session_lifecycle_against_redis() {
    let keys = SigningKeyPair::from_pem(PRIVATE_PEM, PUBLIC_PEM).expect("fixture keys");
    let service = SessionService::new(
        Arc::new(JwtService::new(keys)),
        store().await,
        Duration::from_secs(1200),
    );

    let first = service.login("redis-alice").await.unwrap();
    let second = service.login("redis-alice").await.unwrap();

    assert!(matches!(
        service.authenticate(&first.access_token).await,
        Err(AuthError::InvalidToken)
    ));
    let claims = service.authenticate(&second.access_token).await.unwrap();
    assert_eq!(claims.sub, "redis-alice");

    service.logout("redis-alice").await.unwrap();
    service.logout("redis-alice").await.unwrap();
    assert!(matches!(
        service.authenticate(&second.access_token).await,
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn unreachable_redis_is_fatal() {
    let cfg = RedisConfig {
        host: "127.0.0.1".to_string(),
        port: Some(1),
        timeout_ms: 500,
        ..RedisConfig::default()
    };
    assert!(create_session_store(&cfg).await.is_err());
}

#[tokio::test]
async fn disabled_redis_uses_memory() {
    let cfg = RedisConfig {
        enabled: false,
        ..RedisConfig::default()
    };
    let store = create_session_store(&cfg).await.unwrap();
    store.ping().await.unwrap();
}
