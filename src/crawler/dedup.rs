//! Deduplication store for canonical URLs
//!
//! Records every canonical URL that made it into the frontier. The
//! check-and-insert is a single operation on a sharded concurrent map, so two
//! workers discovering the same link at once cannot both admit it.

use crate::url::CanonicalUrl;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Outcome of a conditional insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The URL was new and the commit step succeeded; it is now recorded
    Committed,
    /// The URL was already recorded
    AlreadySeen,
    /// The URL was new but the commit step failed; nothing was recorded
    RolledBack,
}

#[derive(Debug, Default)]
pub struct DedupStore {
    seen: DashMap<String, ()>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `commit` while the URL's slot is reserved, recording the URL only
    /// if `commit` returns true
    ///
    /// The map shard stays locked for the duration of `commit`, so no other
    /// caller can observe the URL as seen before the outcome is decided.
    /// `commit` must not block or touch this store.
    pub fn insert_with<F>(&self, url: &CanonicalUrl, commit: F) -> Reservation
    where
        F: FnOnce() -> bool,
    {
        match self.seen.entry(url.as_str().to_string()) {
            Entry::Occupied(_) => Reservation::AlreadySeen,
            Entry::Vacant(slot) => {
                if commit() {
                    slot.insert(());
                    Reservation::Committed
                } else {
                    Reservation::RolledBack
                }
            }
        }
    }

    /// Records the URL, returning false if it was already present
    pub fn insert(&self, url: &CanonicalUrl) -> bool {
        self.seen.insert(url.as_str().to_string(), ()).is_none()
    }

    /// Forgets the URL so a later discovery can admit it again
    pub fn remove(&self, url: &CanonicalUrl) -> bool {
        self.seen.remove(url.as_str()).is_some()
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.seen.contains_key(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
