// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL-keyed correlation cache
//!
//! A bounded FIFO buffer holding partial request metadata observed by one
//! event source until the matching event from another source claims it. The
//! host platform gives the paired events no shared request id, so the URL is
//! the best available correlation key; a miss is normal and callers always
//! have a synthesized-default path.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::types::RequestDetails;

/// Default registry capacity, sized to the short window in which paired
/// events normally fire
pub const DEFAULT_REGISTRY_CAPACITY: usize = 256;

/// A partial observation of a request, waiting to be claimed.
///
/// Created on first observation, then consumed or evicted — never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Observed request URL (also the correlation key)
    pub url: String,
    /// Correlated metadata
    pub details: RequestDetails,
    /// When this record was inserted
    pub inserted_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Create a record stamped with the current time
    pub fn new(url: impl Into<String>, details: RequestDetails) -> Self {
        Self {
            url: url.into(),
            details,
            inserted_at: Utc::now(),
        }
    }
}

struct Slot {
    key: String,
    record: PendingRequest,
}

struct Inner {
    /// Fixed slot arena; the write pointer cycles through it so overwrites
    /// always hit the oldest insertion
    slots: Vec<Option<Slot>>,
    /// Key to slot indices, newest first
    index: HashMap<String, VecDeque<usize>>,
    write: usize,
    len: usize,
}

/// Bounded FIFO cache of pending requests, keyed by URL.
///
/// Capacity is fixed at construction; inserting beyond it evicts the oldest
/// entry regardless of key. Several records may share a key; `pop` returns
/// the most recently inserted one. All operations are O(1) and take a single
/// short-held lock, safe under interleaved access from concurrent requests.
pub struct RequestRegistry {
    inner: Mutex<Inner>,
}

impl RequestRegistry {
    /// Create a registry with the given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                slots: (0..capacity).map(|_| None).collect(),
                index: HashMap::new(),
                write: 0,
                len: 0,
            }),
        }
    }

    /// Insert a record under `url`, evicting the oldest entry when full
    pub fn put(&self, url: impl Into<String>, details: RequestDetails) {
        let url = url.into();
        let record = PendingRequest::new(url.clone(), details);

        let mut inner = self.inner.lock();
        let capacity = inner.slots.len();
        let idx = inner.write;
        inner.write = (idx + 1) % capacity;

        if let Some(evicted) = inner.slots[idx].take() {
            inner.len -= 1;
            let now_empty = match inner.index.get_mut(&evicted.key) {
                Some(indexes) => {
                    indexes.retain(|&i| i != idx);
                    indexes.is_empty()
                }
                None => false,
            };
            if now_empty {
                inner.index.remove(&evicted.key);
            }
        }

        inner.index.entry(url.clone()).or_default().push_front(idx);
        inner.slots[idx] = Some(Slot { key: url, record });
        inner.len += 1;
    }

    /// Return and remove the most recent record for `url`, if any
    pub fn pop(&self, url: &str) -> Option<PendingRequest> {
        let mut inner = self.inner.lock();

        let (idx, now_empty) = {
            let indexes = inner.index.get_mut(url)?;
            let idx = indexes.pop_front()?;
            (idx, indexes.is_empty())
        };
        if now_empty {
            inner.index.remove(url);
        }

        let slot = inner.slots[idx].take()?;
        inner.len -= 1;
        Some(slot.record)
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        for slot in inner.slots.iter_mut() {
            *slot = None;
        }
        inner.index.clear();
        inner.write = 0;
        inner.len = 0;
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    /// Whether the registry holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.inner.lock().slots.len()
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(tab_id: i32) -> RequestDetails {
        RequestDetails {
            tab_id,
            ..RequestDetails::synthesized()
        }
    }

    #[test]
    fn test_put_pop_roundtrip() {
        let registry = RequestRegistry::new(4);
        registry.put("https://example.com/a.js", details(1));

        let record = registry.pop("https://example.com/a.js").unwrap();
        assert_eq!(record.details.tab_id, 1);
        assert_eq!(record.url, "https://example.com/a.js");
        assert!(registry.is_empty());

        // A second pop on the same key finds nothing.
        assert!(registry.pop("https://example.com/a.js").is_none());
    }

    #[test]
    fn test_pop_absent_key() {
        let registry = RequestRegistry::new(2);
        registry.put("https://example.com/a.js", details(1));

        assert!(registry.pop("https://example.com/missing.js").is_none());
        // The miss must not disturb other keys.
        assert!(registry.pop("https://example.com/a.js").is_some());
    }

    #[test]
    fn test_fifo_eviction() {
        let registry = RequestRegistry::new(2);
        registry.put("a", details(1));
        registry.put("b", details(2));
        registry.put("c", details(3));

        // "a" was the oldest insertion and is gone.
        assert!(registry.pop("a").is_none());
        assert_eq!(registry.pop("b").unwrap().details.tab_id, 2);
        assert_eq!(registry.pop("c").unwrap().details.tab_id, 3);
    }

    #[test]
    fn test_duplicate_keys_pop_newest_first() {
        let registry = RequestRegistry::new(4);
        registry.put("https://example.com/x", details(1));
        registry.put("https://example.com/x", details(2));

        assert_eq!(registry.pop("https://example.com/x").unwrap().details.tab_id, 2);
        assert_eq!(registry.pop("https://example.com/x").unwrap().details.tab_id, 1);
        assert!(registry.pop("https://example.com/x").is_none());
    }

    #[test]
    fn test_eviction_of_duplicate_key_entry() {
        let registry = RequestRegistry::new(2);
        registry.put("x", details(1));
        registry.put("x", details(2));
        registry.put("y", details(3));

        // The oldest "x" was evicted; the newer one survives.
        assert_eq!(registry.pop("x").unwrap().details.tab_id, 2);
        assert!(registry.pop("x").is_none());
        assert!(registry.pop("y").is_some());
    }

    #[test]
    fn test_clear() {
        let registry = RequestRegistry::new(4);
        registry.put("a", details(1));
        registry.put("b", details(2));
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.pop("a").is_none());

        // Reusable after clearing.
        registry.put("a", details(4));
        assert_eq!(registry.pop("a").unwrap().details.tab_id, 4);
    }

    #[test]
    fn test_capacity_floor() {
        let registry = RequestRegistry::new(0);
        assert_eq!(registry.capacity(), 1);
        registry.put("a", details(1));
        registry.put("b", details(2));
        assert!(registry.pop("a").is_none());
        assert!(registry.pop("b").is_some());
    }

    #[test]
    fn test_default_capacity() {
        let registry = RequestRegistry::default();
        assert_eq!(registry.capacity(), DEFAULT_REGISTRY_CAPACITY);
    }
}
