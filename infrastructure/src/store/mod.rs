//! Record Store adapters.
//!
//! [`InMemoryRecordStore`] keeps every table in memory, applies batches
//! atomically, and can be loaded from and saved to a JSON snapshot file.

mod memory;
mod snapshot;

pub use memory::InMemoryRecordStore;
pub use snapshot::SnapshotError;
