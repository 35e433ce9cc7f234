//! Console Module
//!
//! Line-oriented command interpreter over a shared cache. Used by the binary
//! on stdin/stdout; there is no network listener.
//!
//! # Commands
//! - `PUT <key> <value> [ttl_ms]` - Store a value
//! - `GET <key>` - Read a value, `(nil)` if absent or expired
//! - `DEL <key>` - Delete a key, replies with the number removed
//! - `LEN` - Entry count (not swept first)
//! - `SWEEP` - Remove expired entries, replies with the number removed
//! - `SCAN` - List entries in heap order; only the first line is the soonest
//! - `STATS` - Counters as JSON
//! - `HELP`, `QUIT`

pub mod command;
pub mod session;

pub use command::{Command, CommandError};
pub use session::{execute, run, Reply};
