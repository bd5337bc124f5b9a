//! Memoization Caches
//!
//! Bounded read-through caches for strings that are parsed over and over:
//! permission strings checked on every power use, and declared allow-lists.
//! Inputs are immutable once declared, so a cached entry never goes stale;
//! eviction is least-recently-used.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::{Arc, OnceLock};
use tracing::trace;

use crate::constants::{LIST_SEPARATOR, PERMISSION_CACHE_CAPACITY, PERMISSION_SEPARATOR, WILDCARD_PERMISSION};

const ACCEPTED_VALUES_CAPACITY: usize = 256;

/// LRU-bounded `key -> loader(key)` cache
pub struct MemoCache<V: Clone> {
    entries: Mutex<LruCache<String, V>>,
    loader: fn(&str) -> V,
}

impl<V: Clone> MemoCache<V> {
    pub fn new(capacity: usize, loader: fn(&str) -> V) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            loader,
        }
    }

    /// Cached value for `key`, computed on a miss
    pub fn get(&self, key: &str) -> V {
        let mut entries = self.entries.lock();
        if let Some(hit) = entries.get(key) {
            return hit.clone();
        }
        trace!(key, "memo cache miss");
        let value = (self.loader)(key);
        entries.put(key.to_string(), value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

fn split_trimmed(text: &str, separator: char) -> Arc<Vec<String>> {
    Arc::new(
        text.split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn load_permissions(text: &str) -> Arc<Vec<String>> {
    split_trimmed(text, PERMISSION_SEPARATOR)
}

fn load_accepted_values(text: &str) -> Arc<Vec<String>> {
    split_trimmed(text, LIST_SEPARATOR)
}

static PERMISSION_CACHE: OnceLock<MemoCache<Arc<Vec<String>>>> = OnceLock::new();
static ACCEPTED_VALUES_CACHE: OnceLock<MemoCache<Arc<Vec<String>>>> = OnceLock::new();

/// Size the permission cache. Only the first call (or first use) takes effect.
pub fn init_permission_cache(capacity: usize) -> bool {
    PERMISSION_CACHE
        .set(MemoCache::new(capacity, load_permissions))
        .is_ok()
}

pub fn permission_cache() -> &'static MemoCache<Arc<Vec<String>>> {
    PERMISSION_CACHE.get_or_init(|| MemoCache::new(PERMISSION_CACHE_CAPACITY, load_permissions))
}

pub fn accepted_values_cache() -> &'static MemoCache<Arc<Vec<String>>> {
    ACCEPTED_VALUES_CACHE
        .get_or_init(|| MemoCache::new(ACCEPTED_VALUES_CAPACITY, load_accepted_values))
}

/// Permission nodes of a `;`-separated permission string
pub fn parse_permissions(text: &str) -> Arc<Vec<String>> {
    permission_cache().get(text)
}

/// Something that can hold permission nodes (a player, a test double)
pub trait PermissionHolder {
    fn has_permission(&self, node: &str) -> bool;
    fn grant(&mut self, node: &str);
}

/// Grant the nodes a power's permission string requires.
///
/// Empty and `*` require nothing. Listed permissions are granted in order,
/// each with every dotted prefix (`a.b.c` grants `a`, `a.b`, `a.b.c`), up to
/// the first one the holder already has.
pub fn grant_permissions(holder: &mut dyn PermissionHolder, permissions: &str) {
    let permissions = permissions.trim();
    if permissions.is_empty() || permissions == WILDCARD_PERMISSION {
        return;
    }
    for node in parse_permissions(permissions).iter() {
        if holder.has_permission(node) {
            return;
        }
        let mut prefix = String::with_capacity(node.len());
        for (idx, part) in node.split('.').enumerate() {
            if idx > 0 {
                prefix.push('.');
            }
            prefix.push_str(part);
            holder.grant(&prefix);
        }
    }
}
