use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use super::lazy_iterator::IteratorProfile;
use crate::models::error::AudioError;

/// Explicit release of the native resources a wrapper holds.
///
/// Called by the owning cache exactly when the wrapper leaves it. After
/// teardown a wrapper must refuse further native calls. Implementations
/// must tolerate being called more than once.
pub trait Teardown {
    fn teardown(&self);
}

struct Entries<K, V> {
    order: Vec<(K, Arc<V>)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V> Entries<K, V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (key, _)) in self.order.iter().enumerate() {
            self.index.insert(key.clone(), i);
        }
    }
}

/// Map from a native identity to the single wrapper representing it.
///
/// Population is additive: an identity stays cached until `invalidate` or
/// `clear` removes it, even if the native object has since disappeared.
/// Access is serialized by an internal `parking_lot::Mutex`; teardown of
/// removed wrappers runs after the lock is released.
pub struct IdentityCache<K: Eq + Hash + Clone, V: Teardown> {
    entries: Mutex<Entries<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Teardown> IdentityCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries::new()),
        }
    }

    /// Return the wrapper for `key`, building it with `factory` on first sight.
    ///
    /// A failing factory leaves the cache untouched. The factory runs under
    /// the cache lock and must not call back into this cache.
    pub fn get_or_create<F>(&self, key: K, factory: F) -> Result<Arc<V>, AudioError>
    where
        F: FnOnce(&K) -> Result<V, AudioError>,
    {
        let mut entries = self.entries.lock();
        if let Some(&i) = entries.index.get(&key) {
            return Ok(Arc::clone(&entries.order[i].1));
        }

        let value = Arc::new(factory(&key)?);
        let i = entries.order.len();
        entries.index.insert(key.clone(), i);
        entries.order.push((key, Arc::clone(&value)));
        Ok(value)
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.lock();
        entries.index.get(key).map(|&i| Arc::clone(&entries.order[i].1))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The wrapper at `index` in insertion order.
    pub fn value_at(&self, index: usize) -> Option<Arc<V>> {
        self.entries.lock().order.get(index).map(|(_, v)| Arc::clone(v))
    }

    /// All cached wrappers in insertion order. Callers must not depend on the order.
    pub fn values(&self) -> Vec<Arc<V>> {
        self.entries.lock().order.iter().map(|(_, v)| Arc::clone(v)).collect()
    }

    /// Live iterator profile over the cached wrappers.
    pub fn profile(&self) -> CacheValues<'_, K, V> {
        CacheValues { cache: self }
    }

    /// Remove one identity and tear its wrapper down.
    ///
    /// Returns `false` when the identity was not cached.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            let Some(i) = entries.index.remove(key) else {
                return false;
            };
            let (_, value) = entries.order.remove(i);
            entries.reindex();
            value
        };
        removed.teardown();
        true
    }

    /// Tear down every cached wrapper, in insertion order, and empty the cache.
    ///
    /// Returns the number of wrappers torn down.
    pub fn clear(&self) -> usize {
        let drained = {
            let mut entries = self.entries.lock();
            entries.index.clear();
            std::mem::take(&mut entries.order)
        };
        let count = drained.len();
        for (_, value) in drained {
            value.teardown();
        }
        count
    }
}

impl<K: Eq + Hash + Clone, V: Teardown> Default for IdentityCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V: Teardown> Drop for IdentityCache<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// `IteratorProfile` over the current contents of an `IdentityCache`.
pub struct CacheValues<'a, K: Eq + Hash + Clone, V: Teardown> {
    cache: &'a IdentityCache<K, V>,
}

impl<K: Eq + Hash + Clone, V: Teardown> IteratorProfile for CacheValues<'_, K, V> {
    type Item = Arc<V>;

    fn count(&self) -> Result<usize, AudioError> {
        Ok(self.cache.len())
    }

    fn get(&self, index: usize) -> Result<Arc<V>, AudioError> {
        self.cache.value_at(index).ok_or(AudioError::OutOfRange)
    }
}
