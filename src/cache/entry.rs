//! Cache Entry Module
//!
//! Payload stored in each heap node. The deadline itself is the node's
//! priority and its array position is tracked by the heap.

// == Cache Entry ==
/// A key and its value as held by the expiring cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// The key, duplicated from the key index so the heap root can be
    /// unlinked without a reverse lookup
    pub key: K,
    /// The stored value
    pub value: V,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Consumes the entry, returning its value.
    pub fn into_value(self) -> V {
        self.value
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = Entry::new("key", 7);
        assert_eq!(entry.key, "key");
        assert_eq!(entry.value, 7);
        assert_eq!(entry.into_value(), 7);
    }
}
