//! Cache Module
//!
//! Provides an in-memory, capacity-bounded map with per-entry deadlines and
//! soonest-to-expire eviction.

mod clock;
mod cursor;
mod entry;
mod heap;
mod stats;
mod store;


// Re-export public types
pub use clock::{deadline_after, Clock, ManualClock, SystemClock};
pub use cursor::{Cursor, Iter};
pub use entry::Entry;
pub use heap::{Handle, IndexedMinHeap};
pub use stats::CacheStats;
pub use store::ExpiringCache;
