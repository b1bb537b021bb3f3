//! Process-local session store backed by `DashMap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{SessionRecord, SessionStore};
use crate::AuthResult;

#[derive(Debug, Clone)]
struct Entry {
    record: SessionRecord,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// How often `set` sweeps the whole map for expired entries.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory [`SessionStore`] with per-entry expiry.
///
/// Sessions are not shared between processes, so this store only suits
/// single-instance deployments and tests. An expired entry is evicted when
/// it is next read or deleted, and `set` sweeps the whole map at most once
/// per purge interval so subjects that never return do not pile up.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    entries: Arc<DashMap<String, Entry>>,
    created: Instant,
    purge_interval: Duration,
    /// Milliseconds since `created` at the last sweep.
    last_purge_ms: Arc<AtomicU64>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_purge_interval(DEFAULT_PURGE_INTERVAL)
    }
}

impl MemorySessionStore {
    /// Creates an empty store sweeping every [`DEFAULT_PURGE_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store sweeping at most once per `interval`.
    #[must_use]
    pub fn with_purge_interval(interval: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            created: Instant::now(),
            purge_interval: interval,
            last_purge_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(evicted, "expired sessions purged (memory)");
        }
    }

    /// Sweeps if the interval has elapsed. Only one caller wins a given slot.
    fn maybe_purge(&self) {
        let now_ms = u64::try_from(self.created.elapsed().as_millis()).unwrap_or(u64::MAX);
        let last = self.last_purge_ms.load(Ordering::Relaxed);
        let interval_ms = u64::try_from(self.purge_interval.as_millis()).unwrap_or(u64::MAX);
        if now_ms.saturating_sub(last) < interval_ms {
            return;
        }
        if self
            .last_purge_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.purge_expired();
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, key: &str, record: &SessionRecord, ttl: Duration) -> AuthResult<()> {
        self.maybe_purge();
        self.entries.insert(
            key.to_string(),
            Entry {
                record: record.clone(),
                stored_at: Instant::now(),
                ttl,
            },
        );
        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "session stored (memory)");
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<SessionRecord>> {
        let record = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.record.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if record.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired());
        }
        Ok(record)
    }

    async fn delete(&self, keys: &[&str]) -> AuthResult<u64> {
        let mut deleted = 0;
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(*key) {
                if !entry.is_expired() {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }
}
