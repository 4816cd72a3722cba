//! Bounded artifact history with explicit resource release
//!
//! The store is the single owner of every artifact's media handle: eviction,
//! removal, and session teardown release the underlying payload here and
//! nowhere else. Append and remove are atomic with respect to each other;
//! one lock covers the insert and any eviction it triggers.

use crate::artifact::Artifact;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

pub struct HistoryStore {
    items: Mutex<VecDeque<Artifact>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the front; evict and release the oldest entry when the
    /// store is over capacity.
    pub fn append(&self, artifact: Artifact) {
        let mut items = self.items.lock();
        debug!(artifact_id = artifact.id, "appending artifact to history");
        items.push_front(artifact);
        while items.len() > self.capacity {
            if let Some(evicted) = items.pop_back() {
                debug!(artifact_id = evicted.id, "evicting oldest artifact");
                release_handle(&evicted);
            }
        }
    }

    /// Release and remove the matching artifact. Removing an absent id is a
    /// no-op returning false.
    pub fn remove(&self, id: u64) -> bool {
        let mut items = self.items.lock();
        match items.iter().position(|a| a.id == id) {
            Some(index) => {
                if let Some(removed) = items.remove(index) {
                    release_handle(&removed);
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u64) -> Option<Artifact> {
        self.items.lock().iter().find(|a| a.id == id).cloned()
    }

    /// Snapshot of the history, most-recent-first
    pub fn list(&self) -> Vec<Artifact> {
        self.items.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Release every artifact's resource and empty the store (session end)
    pub fn clear(&self) {
        let mut items = self.items.lock();
        for artifact in items.drain(..) {
            release_handle(&artifact);
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HistoryStore {
    fn drop(&mut self) {
        for artifact in self.items.lock().drain(..) {
            if !artifact.handle.is_released() {
                release_handle(&artifact);
            }
        }
    }
}

// Release failures must never block history operations
fn release_handle(artifact: &Artifact) {
    match artifact.handle.release() {
        Ok(bytes) => debug!(artifact_id = artifact.id, bytes, "released artifact resource"),
        Err(e) => warn!(
            artifact_id = artifact.id,
            "failed to release artifact resource: {}", e
        ),
    }
}
