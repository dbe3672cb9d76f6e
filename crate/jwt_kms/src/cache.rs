use std::sync::Arc;

use lru::LruCache;
use openssl::pkey::{PKey, Public};
use tokio::sync::RwLock;
use tracing::trace;

use crate::config::PublicKeyCacheConfig;

/// The cache of public keys fetched from the remote service
/// The key is the remote key identifier
/// The value is the parsed public key, shared with the verifiers
///
/// Entries are never mutated in place: a key is either present as inserted
/// or absent. Concurrent misses on the same identifier may each insert; the
/// last writer wins.
pub struct PublicKeyCache {
    cache: RwLock<LruCache<String, Arc<PKey<Public>>>>,
}

impl Default for PublicKeyCache {
    fn default() -> Self {
        Self::new(&PublicKeyCacheConfig::default())
    }
}

impl PublicKeyCache {
    #[must_use]
    pub fn new(config: &PublicKeyCacheConfig) -> Self {
        Self {
            cache: RwLock::new(LruCache::new(config.capacity)),
        }
    }

    /// Get a key from the cache, marking it as the most recently used
    pub async fn get(&self, key_id: &str) -> Option<Arc<PKey<Public>>> {
        let found = self.cache.write().await.get(key_id).cloned();
        trace!(
            "public key cache {} for {key_id}",
            if found.is_some() { "hit" } else { "miss" }
        );
        found
    }

    /// Insert into the cache, replacing any previous entry
    pub async fn insert(&self, key_id: String, public_key: Arc<PKey<Public>>) {
        self.cache.write().await.put(key_id, public_key);
    }

    /// Clear a value from the cache
    pub async fn remove(&self, key_id: &str) -> Option<Arc<PKey<Public>>> {
        self.cache.write().await.pop(key_id)
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }
}
