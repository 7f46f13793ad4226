use std::collections::HashMap;

/// How long a computed preview or thumbnail stays valid.
pub const CACHE_TTL_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    cached_at: i64,
}

/// Path-keyed cache whose entries count as absent once older than the TTL.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl_ms: i64,
    entries: HashMap<String, Entry<V>>,
}

pub type PreviewCache = TtlCache<String>;
/// `None` is a cached "no thumbnail found".
pub type ThumbnailCache = TtlCache<Option<String>>;

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(CACHE_TTL_MS)
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, path: &str, now: i64) -> Option<V> {
        self.entries
            .get(path)
            .filter(|e| now - e.cached_at < self.ttl_ms)
            .map(|e| e.value.clone())
    }

    pub fn insert(&mut self, path: &str, value: V, now: i64) {
        self.entries.insert(
            path.to_string(),
            Entry {
                value,
                cached_at: now,
            },
        );
    }

    /// Returns true when an entry was dropped.
    pub fn invalidate(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drops expired entries; returns how many went.
    pub fn sweep(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl_ms;
        self.entries.retain(|_, e| now - e.cached_at < ttl);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
