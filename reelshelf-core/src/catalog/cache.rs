use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use super::model::{CatalogSource, MovieSort};
use super::providers::UpstreamBatch;

/// Identity of one upstream batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub source: CatalogSource,
    pub query: String,
    pub genre: Option<String>,
    pub year: Option<u16>,
    pub sort: Option<MovieSort>,
    pub batch_index: u32,
}

impl BatchKey {
    /// Key of the batch immediately before this one, if any.
    pub fn previous(&self) -> Option<Self> {
        let index = self.batch_index.checked_sub(1)?;
        Some(Self {
            batch_index: index,
            ..self.clone()
        })
    }
}

#[derive(Debug)]
struct CachedBatch {
    batch: Arc<UpstreamBatch>,
    inserted_at: Instant,
}

/// In-memory TTL cache of normalized upstream batches.
///
/// Only successful fetches are stored. When full, expired entries are purged
/// first and then the oldest entry is evicted.
#[derive(Debug)]
pub struct BatchCache {
    entries: DashMap<BatchKey, CachedBatch>,
    ttl: Duration,
    capacity: usize,
}

impl BatchCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &BatchKey) -> Option<Arc<UpstreamBatch>> {
        let hit = self.entries.get(key).and_then(|entry| {
            (entry.inserted_at.elapsed() < self.ttl)
                .then(|| Arc::clone(&entry.batch))
        });

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| {
                entry.inserted_at.elapsed() >= self.ttl
            });
        }
        hit
    }

    pub fn insert(&self, key: BatchKey, batch: Arc<UpstreamBatch>) {
        if !self.entries.contains_key(&key)
            && self.entries.len() >= self.capacity
        {
            self.make_room();
        }

        self.entries.insert(
            key,
            CachedBatch {
                batch,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().inserted_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(key) => {
                    debug!(
                        source = %key.source,
                        batch = key.batch_index,
                        "evicting cached batch"
                    );
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(index: u32) -> BatchKey {
        BatchKey {
            source: CatalogSource::GoogleBooks,
            query: "dune".into(),
            genre: None,
            year: None,
            sort: None,
            batch_index: index,
        }
    }

    fn batch() -> Arc<UpstreamBatch> {
        Arc::new(UpstreamBatch {
            items: Vec::new(),
            raw_len: 0,
            next: None,
            total_results: None,
            exact_total: false,
        })
    }

    #[test]
    fn returns_fresh_entries() {
        let cache = BatchCache::new(Duration::from_secs(60), 4);
        cache.insert(key(0), batch());
        assert!(cache.get(&key(0)).is_some());
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = BatchCache::new(Duration::ZERO, 4);
        cache.insert(key(0), batch());
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = BatchCache::new(Duration::from_secs(60), 2);
        cache.insert(key(0), batch());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(key(1), batch());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(key(2), batch());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.get(&key(2)).is_some());
    }

    #[test]
    fn previous_key_walks_back() {
        assert_eq!(key(2).previous(), Some(key(1)));
        assert_eq!(key(0).previous(), None);
    }
}
