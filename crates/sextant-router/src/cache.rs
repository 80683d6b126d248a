//! Bounded resolution cache.

use std::collections::HashMap;

use http::Method;
use parking_lot::RwLock;

use crate::RouteMatch;

/// Memoizes successful resolutions by exact `(method, path)`.
///
/// Entries are never evicted. Once `capacity` entries are stored, new
/// resolutions are simply not cached. A capacity of zero disables caching.
pub(crate) struct ResolveCache<T> {
    capacity: usize,
    entries: RwLock<HashMap<(Method, String), RouteMatch<T>>>,
}

impl<T> ResolveCache<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn get(&self, method: &Method, path: &str) -> Option<RouteMatch<T>> {
        if self.capacity == 0 {
            return None;
        }
        self.entries
            .read()
            .get(&(method.clone(), path.to_string()))
            .cloned()
    }

    pub(crate) fn insert(&self, method: &Method, path: &str, found: &RouteMatch<T>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.len() < self.capacity {
            entries.insert((method.clone(), path.to_string()), found.clone());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<T> std::fmt::Debug for ResolveCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
