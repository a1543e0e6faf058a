use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use tokio::time::{Duration, Instant};

/// Entry bound used when none is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// A rendered public response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub content_type: String,
    pub body: String,
}

struct Entry {
    page: CachedPage,
    stored_at: Instant,
}

/// Process-wide cache of rendered pages keyed by request path.
///
/// Entries expire after `ttl`; editors can also drop them explicitly through
/// [`invalidate`](Self::invalidate). At most `max_entries` pages are kept, the
/// least recently used one making room for a new path. The lock is never held
/// across an await.
pub struct PageCache {
    ttl: Duration,
    entries: Mutex<LruCache<String, Entry>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `path`, if any. A stale entry is dropped on lookup.
    pub fn get(&self, path: &str) -> Option<CachedPage> {
        let mut entries = self.entries.lock().ok()?;
        let fresh = entries
            .get(path)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.page.clone());
        if fresh.is_none() {
            entries.pop(path);
        }
        fresh
    }

    pub fn insert(&self, path: &str, page: CachedPage) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            let evicted = entries.push(
                path.to_string(),
                Entry {
                    page,
                    stored_at: Instant::now(),
                },
            );
            if let Some((key, _)) = evicted.filter(|(key, _)| key != path) {
                tracing::debug!(path = %key, "Page cache full, evicted least recently used");
            }
        }
    }

    /// Drop `path` and every cached path below it (`/blog` also drops
    /// `/blog/page/2` and `/blog/2024/...`). Returns the number of entries removed.
    pub fn invalidate(&self, path: &str) -> usize {
        let prefix = path.trim_end_matches('/');
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let stale: Vec<String> = entries
            .iter()
            .filter(|(key, _)| covers(prefix, key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        tracing::info!(path, removed = stale.len(), "Page cache invalidated");
        stale.len()
    }

    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let removed = entries.len();
            entries.clear();
            tracing::info!(removed, "Page cache flushed");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn covers(prefix: &str, key: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    key == prefix
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
