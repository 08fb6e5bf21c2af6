// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read-through cache: look a key up locally, otherwise ask the source and
// remember what it found.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

/// Backing store consulted on a cache miss.
pub trait Source {
    type Key: Eq + Hash + Clone;
    type Value: Clone;

    /// `None` when the source has no value for `key`.
    fn fetch(&self, key: &Self::Key) -> Option<Self::Value>;
}

/// Memoises found values from a [`Source`].
///
/// Misses are not remembered: asking again for an absent key asks the source
/// again.  The lock is held across the fetch, so a key is fetched at most
/// once after it has been found, even under concurrent `get`s.
pub struct ReadThroughCache<S: Source> {
    source: S,
    entries: Mutex<HashMap<S::Key, S::Value>>,
}

impl<S: Source> ReadThroughCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, fetching and storing it on a miss.
    pub fn get(&self, key: &S::Key) -> Option<S::Value> {
        let mut entries = self.lock();
        if let Some(value) = entries.get(key) {
            return Some(value.clone());
        }

        let value = self.source.fetch(key)?;
        entries.insert(key.clone(), value.clone());
        debug!(cached = entries.len(), "cache filled from source");
        Some(value)
    }

    /// Forget `key`; the next `get` goes to the source.
    pub fn invalidate(&self, key: &S::Key) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // A panic inside `fetch` leaves the map itself consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<S::Key, S::Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
