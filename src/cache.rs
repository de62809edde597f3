use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::{DiseaseId, GeneSymbol};

/// Cache key with a distinct prefix per query type, so a target and a
/// disease can never share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Target(GeneSymbol),
    Disease(DiseaseId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Target(gene) => write!(f, "target:{gene}"),
            CacheKey::Disease(disease) => write!(f, "disease:{disease}"),
        }
    }
}

struct CacheEntry<T> {
    value: Arc<T>,
    inserted_at: Instant,
}

/// Process-wide TTL cache. Expired entries read as misses; every write also
/// sweeps out whatever has expired. Concurrent misses on one key may each
/// fetch; the last write wins.
pub struct ResponseCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        let key = key.to_string();
        let mut entries = self.lock();
        match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                Some(Arc::clone(&entry.value))
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &CacheKey, value: Arc<T>) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let ttl = self.ttl;
        let mut entries = self.lock();
        entries.retain(|_, existing| existing.inserted_at.elapsed() < ttl);
        entries.insert(key.to_string(), entry);
    }

    /// Live entries only.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // Entries are replaced whole, so a panic mid-insert leaves no torn value.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
