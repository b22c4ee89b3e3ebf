//! In-memory memo caches for Wikidata lookups.
//!
//! Only positive results are stored. Entries are never invalidated unless the cache
//! was configured with a TTL; with `max_entries`, the least recently used entry is evicted.

use crate::config::{CacheConfig, CacheKeying};
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// A thread-safe map with optional size bound and TTL, backed by moka.
/// Clones share the same storage.
#[derive(Clone)]
pub struct MemoCache<K, V> {
    inner: Cache<K, V>,
    counters: Arc<StatCounters>,
}

impl<K, V> fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("entry_count", &self.inner.entry_count())
            .field("counters", &self.counters)
            .finish()
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: Option<usize>, ttl: Option<Duration>) -> Self {
        let counters = Arc::new(StatCounters::default());
        let evictions = counters.clone();
        let mut builder = Cache::<K, V>::builder()
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |_key, _value, cause: RemovalCause| {
                if cause.was_evicted() {
                    evictions.evictions.fetch_add(1, Ordering::Relaxed);
                }
            });
        if let Some(max_entries) = max_entries {
            builder = builder.max_capacity(max_entries as u64);
        }
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
            counters,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let ret = self.inner.get(key);
        let counter = match ret {
            Some(_) => &self.counters.hits,
            None => &self.counters.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        ret
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of live entries, after pending evictions and expirations have been applied.
    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        self.inner.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryKey {
    title: String,
    language: Option<String>,
}

/// Category title => QID.
#[derive(Debug, Clone)]
pub struct CategoryCache {
    keying: CacheKeying,
    cache: MemoCache<CategoryKey, String>,
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new(CacheKeying::default(), &CacheConfig::default())
    }
}

impl CategoryCache {
    pub fn new(keying: CacheKeying, config: &CacheConfig) -> Self {
        Self {
            keying,
            cache: MemoCache::from_config(config),
        }
    }

    pub fn keying(&self) -> CacheKeying {
        self.keying
    }

    fn key(&self, category: &str, language: &str) -> CategoryKey {
        let language = match self.keying {
            CacheKeying::TitleOnly => None,
            CacheKeying::TitleAndLanguage => Some(language.to_string()),
        };
        CategoryKey {
            title: category.to_string(),
            language,
        }
    }

    pub fn get(&self, category: &str, language: &str) -> Option<String> {
        self.cache.get(&self.key(category, language))
    }

    pub fn insert(&self, category: &str, language: &str, qid: &str) {
        self.cache
            .insert(self.key(category, language), qid.to_string());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// (QID, target language) => title.
#[derive(Debug, Clone, Default)]
pub struct TargetTitleCache {
    cache: MemoCache<(String, String), String>,
}

impl TargetTitleCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: MemoCache::from_config(config),
        }
    }

    pub fn get(&self, qid: &str, language: &str) -> Option<String> {
        self.cache.get(&(qid.to_string(), language.to_string()))
    }

    pub fn insert(&self, qid: &str, language: &str, title: &str) {
        self.cache
            .insert((qid.to_string(), language.to_string()), title.to_string());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
