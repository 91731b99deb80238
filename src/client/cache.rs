//! Process-wide collection cache keyed by resource name.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Entry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    stale: bool,
    /// Bumped by every invalidation.
    generation: u64,
}

/// Shared cache of fetched collections. Clones share the same store.
///
/// A fetch records [`QueryCache::generation`] before it starts and hands it
/// back to [`QueryCache::put`]; the result is dropped if the key was
/// invalidated in between.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<&'static str, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The cached collection for `key`, unless missing or stale.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &'static str) -> Option<Vec<T>> {
        let entries = self.lock();
        let entry = entries.get(key)?;
        if entry.stale {
            return None;
        }
        entry.data.as_ref()?.downcast_ref::<Vec<T>>().cloned()
    }

    /// Current invalidation count for `key`.
    pub fn generation(&self, key: &'static str) -> u64 {
        self.lock().get(key).map_or(0, |e| e.generation)
    }

    /// Store `items` fetched at `generation`.
    ///
    /// Returns false, leaving the cache untouched, when `key` has been
    /// invalidated since.
    pub fn put<T: Send + Sync + 'static>(
        &self,
        key: &'static str,
        items: Vec<T>,
        generation: u64,
    ) -> bool {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        if entry.generation != generation {
            return false;
        }
        entry.data = Some(Arc::new(items));
        entry.stale = false;
        true
    }

    /// Mark `key` stale so the next read re-fetches, and void fetches in flight.
    pub fn invalidate(&self, key: &'static str) {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.stale = true;
        entry.generation += 1;
    }

    pub fn is_fresh(&self, key: &'static str) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|e| e.data.is_some() && !e.stale)
    }
}
