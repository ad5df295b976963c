//! In-memory cache of containers known to exist in the embedded engine.
//!
//! The registry only lets `put` skip a create-if-missing transaction. It is
//! never consulted to allow or reject an operation: when it is stale the
//! engine stays the source of truth.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Set of container names behind a mutex.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    names: Mutex<HashSet<String>>,
}

impl ContainerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned guard still holds a usable set; the registry is advisory.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `true` if the container is known to exist.
    pub fn exists(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Record a container as existing. Idempotent.
    pub fn remember(&self, name: &str) {
        let mut names = self.lock();
        if !names.contains(name) {
            names.insert(name.to_string());
        }
    }

    /// Drop a container from the registry, e.g. after it was deleted.
    pub fn forget(&self, name: &str) {
        self.lock().remove(name);
    }

    /// Replace the whole set with the engine's current listing.
    pub fn replace_all<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.lock();
        set.clear();
        set.extend(names.into_iter().map(Into::into));
    }

    /// Number of known containers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no container is known.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted snapshot of the known container names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().iter().cloned().collect();
        names.sort();
        names
    }
}
