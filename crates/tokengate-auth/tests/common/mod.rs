//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use tokengate_auth::{
    AuthState, CookieConfig, JwtService, MemorySessionStore, SessionService, SessionStore,
    SigningKeyPair,
};

pub const PRIVATE_PEM: &str = include_str!("../fixtures/signing_private.pem");
pub const PUBLIC_PEM: &str = include_str!("../fixtures/signing_public.pem");
pub const FOREIGN_PRIVATE_PEM: &str = include_str!("../fixtures/foreign_private.pem");
pub const FOREIGN_PUBLIC_PEM: &str = include_str!("../fixtures/foreign_public.pem");

pub const LIFETIME: Duration = Duration::from_secs(1200);

pub fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(
        SigningKeyPair::from_pem(PRIVATE_PEM, PUBLIC_PEM).expect("fixture keys"),
    ))
}

static SHARED_JWT: LazyLock<Arc<JwtService>> = LazyLock::new(jwt);

/// One parsed key pair for tests that sign in a loop.
pub fn shared_jwt() -> Arc<JwtService> {
    Arc::clone(&SHARED_JWT)
}

pub fn foreign_jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(
        SigningKeyPair::from_pem(FOREIGN_PRIVATE_PEM, FOREIGN_PUBLIC_PEM).expect("fixture keys"),
    ))
}

pub fn sessions() -> (SessionService, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let service = SessionService::new(jwt(), store.clone() as Arc<dyn SessionStore>, LIFETIME);
    (service, store)
}

pub fn auth_state() -> AuthState {
    let (service, _) = sessions();
    AuthState::new(service, CookieConfig::production("token"))
}
