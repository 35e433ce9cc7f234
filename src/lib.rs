//! Expiring Map - An in-memory map with per-entry deadlines
//!
//! Entries expire lazily and, once the map is full, the entry due soonest is
//! evicted to make room.

pub mod cache;
pub mod config;
pub mod console;
pub mod error;
pub mod shared;

pub use cache::{Cursor, ExpiringCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use shared::SharedCache;
