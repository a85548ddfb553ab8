//! Bounded, insertion-ordered cache with age-based validity.
//!
//! Entries live in a slot arena threaded by a doubly linked list in store
//! order; a hash index maps each key to its slot. The head of the list is the
//! least-recently-stored entry and is the one evicted when a new key arrives
//! at capacity. Reads never reorder the list.
//!
//! The cache does no locking and never reads the clock itself: callers pass
//! `now` in and wrap the cache in their own mutex.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Default maximum number of cached locations.
pub const DEFAULT_CAPACITY: usize = 10;

/// Default age after which an entry no longer satisfies a lookup.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Sizing and validity window for a [`TtlCache`].
///
/// ```rust
/// # use weather_sdk::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .capacity(20)
///     .ttl(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries. Default: 10. Zero is treated as one.
    pub capacity: usize,
    /// Entries at least this old are misses. Default: 10 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// One cached key/value pair and the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    slots: Vec<Slot<V>>,
    index: HashMap<String, usize>,
    /// Least-recently-stored slot.
    head: Option<usize>,
    /// Most-recently-stored slot.
    tail: Option<usize>,
    capacity: usize,
    ttl: Duration,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
            ttl: config.ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `key` is present, fresh or not.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Stored keys, least-recently-stored first.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = &self.slots[idx];
            keys.push(slot.entry.key.clone());
            cursor = slot.next;
        }
        keys
    }

    /// Store `value` under `key` as the most recently stored entry.
    ///
    /// An existing key is overwritten and moved to the back of the eviction
    /// order. A new key arriving at capacity evicts the least-recently-stored
    /// entry first; its key is returned.
    pub fn store(&mut self, key: &str, value: V, now: Instant) -> Option<String> {
        if let Some(&idx) = self.index.get(key) {
            self.unlink(idx);
            let entry = &mut self.slots[idx].entry;
            entry.value = value;
            entry.inserted_at = now;
            self.link_back(idx);
            return None;
        }

        let entry = CacheEntry {
            key: key.to_owned(),
            value,
            inserted_at: now,
        };

        if self.slots.len() < self.capacity {
            let idx = self.slots.len();
            self.slots.push(Slot {
                entry,
                prev: None,
                next: None,
            });
            self.index.insert(key.to_owned(), idx);
            self.link_back(idx);
            return None;
        }

        // Full: the oldest slot is reused for the new key.
        let idx = self.head?;
        self.unlink(idx);
        let evicted = std::mem::replace(&mut self.slots[idx].entry, entry);
        self.index.remove(&evicted.key);
        self.index.insert(key.to_owned(), idx);
        self.link_back(idx);

        debug!(evicted = %evicted.key, inserted = %key, "cache full, evicted oldest entry");
        Some(evicted.key)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        let slot = &mut self.slots[idx];
        slot.prev = None;
        slot.next = None;
    }

    fn link_back(&mut self, idx: usize) {
        self.slots[idx].prev = self.tail;
        self.slots[idx].next = None;

        match self.tail {
            Some(t) => self.slots[t].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

impl<V: Clone> TtlCache<V> {
    /// Copy of the value under `key` if it was stored less than `ttl` before
    /// `now`. Stale entries read as misses but stay in place until the key is
    /// stored again or evicted.
    pub fn lookup(&self, key: &str, now: Instant) -> Option<V> {
        let idx = *self.index.get(key)?;
        let entry = &self.slots[idx].entry;
        entry.is_fresh(now, self.ttl).then(|| entry.value.clone())
    }
}
