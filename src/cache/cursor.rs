//! Cursor Module
//!
//! Read-only traversal over a cache's entries.

use std::iter::FusedIterator;
use std::time::Instant;

use crate::cache::heap::IndexedMinHeap;
use crate::cache::Entry;

// == Cursor ==
/// Bidirectional cursor over the entries of an
/// [`ExpiringCache`](crate::cache::ExpiringCache).
///
/// Entries are visited in the heap's internal array order. Only the first
/// position is meaningful: it holds the entry due soonest. The remaining
/// positions are NOT sorted by deadline, so do not rely on the walk being
/// ascending.
///
/// The cursor borrows the cache, which rules out `put`, `get`, `delete` and
/// `sweep` while it is alive. It does not sweep, so entries that have
/// expired but were not yet removed are still visited.
#[derive(Debug)]
pub struct Cursor<'a, K, V> {
    heap: &'a IndexedMinHeap<Instant, Entry<K, V>>,
    index: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(heap: &'a IndexedMinHeap<Instant, Entry<K, V>>) -> Self {
        Self { heap, index: 0 }
    }

    /// Returns true while the cursor points at an entry.
    pub fn valid(&self) -> bool {
        self.index < self.heap.len()
    }

    /// Advances one position. Does nothing once the cursor is invalid.
    pub fn move_next(&mut self) {
        if self.valid() {
            self.index += 1;
        }
    }

    /// Steps back one position. Stepping back from the first entry leaves
    /// the cursor invalid.
    pub fn move_prev(&mut self) {
        if self.valid() {
            // 0 wraps to usize::MAX, which is never a valid position.
            self.index = self.index.wrapping_sub(1);
        }
    }

    /// Returns the current array position, if valid.
    pub fn position(&self) -> Option<usize> {
        self.valid().then_some(self.index)
    }

    pub fn key(&self) -> Option<&'a K> {
        self.heap.at(self.index).map(|(_, entry)| &entry.key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.heap.at(self.index).map(|(_, entry)| &entry.value)
    }

    /// Returns the deadline of the current entry.
    pub fn expire_at(&self) -> Option<Instant> {
        self.heap.at(self.index).map(|(&at, _)| at)
    }
}

// == Iter ==
/// Iterator over `(key, value, deadline)` in the same order as [`Cursor`].
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    heap: &'a IndexedMinHeap<Instant, Entry<K, V>>,
    index: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(heap: &'a IndexedMinHeap<Instant, Entry<K, V>>) -> Self {
        Self { heap, index: 0 }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V, Instant);

    fn next(&mut self) -> Option<Self::Item> {
        let (&at, entry) = self.heap.at(self.index)?;
        self.index += 1;
        Some((&entry.key, &entry.value, at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.heap.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
