//! Local product cache for offline support.
//!
//! Holds the raw records of the last successful fetch. The collection is
//! replaced as a whole on every refresh and read back when the network is
//! unreachable.

mod storage;

pub use storage::{ProductStore, SqliteProductStore, UnavailableStore};
