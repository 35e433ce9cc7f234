//! Cache Store Module
//!
//! Main cache engine combining a key index with an indexed min-heap ordered by
//! deadline.
//!
//! Expired entries are removed lazily: `put`, `get` and `delete` sweep every
//! entry whose deadline has passed before doing their own work. Nothing runs
//! in the background. A single call may therefore remove many entries at once,
//! costing O(k log n) for k expired entries, so latency is not constant.
//!
//! The store does no locking of its own. Wrap it (see
//! [`SharedCache`](crate::shared::SharedCache)) to share it between tasks.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::cache::clock::{deadline_after, Clock, SystemClock};
use crate::cache::heap::{Handle, IndexedMinHeap};
use crate::cache::{CacheStats, Cursor, Entry, Iter};
use crate::error::{CacheError, Result};

/// Upper bound on storage reserved up front, regardless of capacity.
const PREALLOCATE_LIMIT: usize = 4096;

// == Expiring Cache ==
/// Capacity-bounded map whose entries each carry their own deadline.
///
/// When an insert would exceed capacity, the entry closest to its deadline is
/// evicted, even if it has not expired yet. Recency of access plays no part.
#[derive(Debug)]
pub struct ExpiringCache<K, V, C = SystemClock> {
    /// Key -> heap node
    index: HashMap<K, Handle>,
    /// Entries ordered by deadline
    heap: IndexedMinHeap<Instant, Entry<K, V>>,
    /// Maximum number of entries
    capacity: usize,
    /// Time source for deadlines and sweeps
    clock: C,
    /// Activity counters
    stats: CacheStats,
}

impl<K, V> ExpiringCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries, timed by the
    /// system clock.
    ///
    /// Fails with [`CacheError::InvalidCapacity`] if `capacity` is zero or
    /// negative.
    pub fn new<N>(capacity: N) -> Result<Self>
    where
        N: TryInto<usize> + fmt::Display + Copy,
    {
        Self::with_clock(capacity, SystemClock)
    }
}

impl<K, V, C> ExpiringCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock<N>(capacity: N, clock: C) -> Result<Self>
    where
        N: TryInto<usize> + fmt::Display + Copy,
    {
        let capacity = match capacity.try_into() {
            Ok(n) if n > 0 => n,
            _ => return Err(CacheError::InvalidCapacity(capacity.to_string())),
        };
        let reserve = capacity.min(PREALLOCATE_LIMIT);

        Ok(Self {
            index: HashMap::with_capacity(reserve),
            heap: IndexedMinHeap::with_capacity(reserve),
            capacity,
            clock,
            stats: CacheStats::new(),
        })
    }

    // == Put ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// An existing key keeps its slot: the value is replaced and the new
    /// deadline overwrites the old one, whether earlier or later. A new key
    /// arriving at a full cache first evicts the entry due soonest.
    pub fn put(&mut self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now();
        self.sweep_at(now);
        let expire_at = deadline_after(now, ttl);

        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.heap.get_mut(handle) {
                entry.value = value;
            }
            self.heap.set_priority(handle, expire_at);
            trace!(?ttl, "updated entry in place");
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict_soonest();
        }

        let handle = self.heap.push(expire_at, Entry::new(key.clone(), value));
        self.index.insert(key, handle);
        trace!(?ttl, len = self.index.len(), "inserted entry");
    }

    // == Get ==
    /// Returns the value for `key` if it is present and unexpired.
    ///
    /// Reading does not extend the entry's deadline.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sweep();

        match self.index.get(key).copied() {
            Some(handle) => {
                self.stats.record_hit();
                self.heap.get(handle).map(|entry| &entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sweep();

        let handle = self.index.remove(key)?;
        self.heap
            .remove(handle)
            .map(|(_, entry)| entry.into_value())
    }

    // == Sweep ==
    /// Removes every entry whose deadline is at or before now.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        self.sweep_at(now)
    }

    fn sweep_at(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while self.heap.peek().is_some_and(|(&at, _)| at <= now) {
            if let Some((_, entry)) = self.heap.pop() {
                self.index.remove(&entry.key);
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.record_expirations(removed);
            debug!(removed, remaining = self.index.len(), "swept expired entries");
        }
        removed
    }

    fn evict_soonest(&mut self) {
        if let Some((_, entry)) = self.heap.pop() {
            self.index.remove(&entry.key);
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "evicted entry due soonest");
        }
    }

    // == Length ==
    /// Returns the number of stored entries.
    ///
    /// No sweep happens first, so entries that expired since the last
    /// `put`/`get`/`delete`/`sweep` are still counted.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no entries are stored. Same staleness as [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Inspection ==
    /// Returns the stored deadline for `key` without sweeping.
    pub fn expire_at<Q>(&self, key: &Q) -> Option<Instant>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;
        self.heap.priority(handle).copied()
    }

    /// Returns the entry that would be evicted next, without sweeping.
    pub fn peek_soonest(&self) -> Option<(&K, &V, Instant)> {
        self.heap
            .peek()
            .map(|(&at, entry)| (&entry.key, &entry.value, at))
    }

    // == Traversal ==
    /// Returns a cursor positioned at the entry due soonest.
    ///
    /// See [`Cursor`] for the traversal order.
    pub fn cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.heap)
    }

    /// Iterates entries in the same order as [`cursor`](Self::cursor).
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.heap)
    }

    // == Invariant Check ==
    /// Checks that the key index and the heap describe the same entries.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.heap.is_consistent()
            && self.index.len() == self.heap.len()
            && self
                .index
                .iter()
                .all(|(key, &handle)| self.heap.get(handle).is_some_and(|e| &e.key == key))
    }
}

impl<'a, K, V, C> IntoIterator for &'a ExpiringCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    type Item = (&'a K, &'a V, Instant);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
