//! Indexed Min-Heap Module
//!
//! Array-backed binary min-heap that can re-prioritise or remove any element
//! in O(log n), not just the root.
//!
//! Nodes live directly in the heap array. Each node carries the [`Handle`] it
//! was issued on insertion, and a position table maps every live handle back
//! to the node's current array index. Every swap rewrites both entries of that
//! table, so for each live position `p`:
//!
//! ```text
//! positions[nodes[p].handle] == p
//! ```

/// Marks a position-table slot whose node has been removed.
const VACANT: usize = usize::MAX;

// == Handle ==
/// Stable reference to a heap node, independent of its array position.
///
/// A handle stays valid until its node is removed. Afterwards the slot may be
/// reissued to a new node, so callers must drop handles they removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Debug)]
struct Node<P, T> {
    priority: P,
    handle: Handle,
    item: T,
}

// == Indexed Min-Heap ==
/// Min-heap over priority `P` carrying payload `T`.
///
/// Equal priorities are ordered arbitrarily.
#[derive(Debug)]
pub struct IndexedMinHeap<P, T> {
    /// Heap-ordered nodes
    nodes: Vec<Node<P, T>>,
    /// Handle slot -> current array index (or `VACANT`)
    positions: Vec<usize>,
    /// Handle slots available for reuse
    free: Vec<usize>,
}

impl<P: Ord, T> IndexedMinHeap<P, T> {
    // == Constructor ==
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty heap with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    // == Length ==
    /// Returns the number of nodes in the heap.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the heap holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // == Push ==
    /// Inserts `item` with `priority` and returns its handle.
    pub fn push(&mut self, priority: P, item: T) -> Handle {
        let pos = self.nodes.len();
        let handle = match self.free.pop() {
            Some(slot) => {
                self.positions[slot] = pos;
                Handle(slot)
            }
            None => {
                self.positions.push(pos);
                Handle(self.positions.len() - 1)
            }
        };

        self.nodes.push(Node {
            priority,
            handle,
            item,
        });
        self.sift_up(pos);
        handle
    }

    // == Peek ==
    /// Returns the root, the node with the smallest priority.
    pub fn peek(&self) -> Option<(&P, &T)> {
        self.at(0)
    }

    // == Pop ==
    /// Removes and returns the root.
    pub fn pop(&mut self) -> Option<(P, T)> {
        self.remove_at(0)
    }

    // == Fix ==
    /// Restores heap order after the priority at `pos` changed.
    ///
    /// Moves the node down if it grew, otherwise up. Out-of-range positions
    /// are ignored.
    pub fn fix(&mut self, pos: usize) {
        if pos >= self.nodes.len() {
            return;
        }
        if !self.sift_down(pos) {
            self.sift_up(pos);
        }
    }

    // == Remove At ==
    /// Removes the node at array position `pos`.
    ///
    /// The last node is swapped into the hole and resifted in whichever
    /// direction it needs to go.
    pub fn remove_at(&mut self, pos: usize) -> Option<(P, T)> {
        let last = self.nodes.len().checked_sub(1)?;
        if pos > last {
            return None;
        }
        if pos != last {
            self.swap(pos, last);
        }

        let node = self.nodes.pop()?;
        self.positions[node.handle.0] = VACANT;
        self.free.push(node.handle.0);

        if pos < self.nodes.len() {
            self.fix(pos);
        }
        Some((node.priority, node.item))
    }

    // == Handle Access ==
    /// Returns the current array position of `handle`.
    pub fn position(&self, handle: Handle) -> Option<usize> {
        match self.positions.get(handle.0) {
            Some(&pos) if pos != VACANT => Some(pos),
            _ => None,
        }
    }

    /// Returns the payload behind `handle`.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let pos = self.position(handle)?;
        Some(&self.nodes[pos].item)
    }

    /// Returns the payload behind `handle` mutably. The priority is not
    /// reachable this way, so heap order cannot be broken through it.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let pos = self.position(handle)?;
        Some(&mut self.nodes[pos].item)
    }

    /// Returns the priority of `handle`.
    pub fn priority(&self, handle: Handle) -> Option<&P> {
        let pos = self.position(handle)?;
        Some(&self.nodes[pos].priority)
    }

    /// Replaces the priority of `handle` and fixes its position.
    ///
    /// Returns false if the handle is not live.
    pub fn set_priority(&mut self, handle: Handle, priority: P) -> bool {
        match self.position(handle) {
            Some(pos) => {
                self.nodes[pos].priority = priority;
                self.fix(pos);
                true
            }
            None => false,
        }
    }

    /// Removes the node behind `handle`.
    pub fn remove(&mut self, handle: Handle) -> Option<(P, T)> {
        let pos = self.position(handle)?;
        self.remove_at(pos)
    }

    // == Positional Access ==
    /// Returns the node at array position `pos`.
    pub fn at(&self, pos: usize) -> Option<(&P, &T)> {
        self.nodes.get(pos).map(|n| (&n.priority, &n.item))
    }

    /// Iterates nodes in array order. Only the first one is guaranteed to be
    /// the minimum.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &T)> + '_ {
        self.nodes.iter().map(|n| (&n.priority, &n.item))
    }

    // == Sifting ==
    fn swap(&mut self, i: usize, j: usize) {
        self.nodes.swap(i, j);
        self.positions[self.nodes[i].handle.0] = i;
        self.positions[self.nodes[j].handle.0] = j;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.nodes[parent].priority <= self.nodes[pos].priority {
                break;
            }
            self.swap(parent, pos);
            pos = parent;
        }
    }

    /// Returns true if the node moved.
    fn sift_down(&mut self, start: usize) -> bool {
        let len = self.nodes.len();
        let mut pos = start;
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.nodes[right].priority < self.nodes[left].priority {
                right
            } else {
                left
            };
            if self.nodes[pos].priority <= self.nodes[child].priority {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
        pos > start
    }

    // == Invariant Check ==
    /// Checks heap order and the position table against each other.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let ordered = (1..self.nodes.len())
            .all(|p| self.nodes[(p - 1) / 2].priority <= self.nodes[p].priority);
        let indexed = self
            .nodes
            .iter()
            .enumerate()
            .all(|(p, n)| self.positions[n.handle.0] == p);
        let live = self.positions.iter().filter(|&&p| p != VACANT).count();
        ordered && indexed && live == self.nodes.len()
    }
}

impl<P: Ord, T> Default for IndexedMinHeap<P, T> {
    fn default() -> Self {
        Self::new()
    }
}
