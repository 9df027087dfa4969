// # Release Store Implementations
//
// This module provides the in-memory implementation of the ReleaseStore
// trait. The durable SQLite implementation lives in `spindle-store-sqlite`.

pub mod memory;

pub use memory::MemoryReleaseStore;
