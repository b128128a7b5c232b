use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::interval;

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

struct CacheEntry {
    value: Value,
    expires_at: i64,
}

/// Fixed-TTL cache of JSON responses keyed by request URI. Any mutation
/// clears the whole cache.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl_ms: i64,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: ttl.as_millis() as i64,
            enabled: true,
        }
    }

    /// Every lookup misses and nothing is stored.
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: 0,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, now_ms())
    }

    pub fn get_at(&self, key: &str, now: i64) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let entry = self.entries.get(key)?;
        if entry.expires_at > now {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove_if(key, |_, e| e.expires_at <= now);
        None
    }

    pub fn insert(&self, key: String, value: Value) {
        self.insert_at(key, value, now_ms());
    }

    pub fn insert_at(&self, key: String, value: Value, now: i64) {
        if !self.enabled {
            return;
        }
        let expires_at = now + self.ttl_ms;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(now_ms())
    }

    pub fn sweep_at(&self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodic sweep. The task ends once the cache is dropped.
    pub fn spawn_sweeper(cache: &Arc<ResponseCache>, every: Duration) {
        let cache: Weak<ResponseCache> = Arc::downgrade(cache);
        actix_web::rt::spawn(async move {
            let mut ticker = interval(every);
            // first tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    log::debug!("Response cache sweep removed {} entries", removed);
                }
            }
        });
    }
}
