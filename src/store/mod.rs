//! Durable store boundary. Everything persistent in this application goes
//! through [`StoreAdapter`]: two raw text blobs, one per collection, looked up
//! by fixed key. The adapter is deliberately dumb so the repositories own all
//! serialization decisions and tests can swap in an in-memory double.

mod memory;
mod sqlite;

use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key under which the book collection is persisted.
pub const BOOKS_KEY: &str = "books";
/// Key under which the loan ledger is persisted.
pub const LOANS_KEY: &str = "loans";

/// Failures surfaced by a store backend. None of these are fatal to the
/// session: reads degrade to defaults and writes are logged and swallowed at
/// the call site, with the in-memory state staying authoritative.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be opened or prepared.
    #[error("failed to open durable store: {0}")]
    Open(String),
    /// A stored value exists but could not be read back.
    #[error("failed to read key {key:?} from store: {reason}")]
    Read { key: String, reason: String },
    /// A value could not be written (quota, I/O, constraint).
    #[error("failed to write key {key:?} to store: {reason}")]
    Write { key: String, reason: String },
}

/// Get/set of raw text blobs keyed by name. The only trait in the core; it
/// exists so the repositories never learn which backend is underneath.
pub trait StoreAdapter {
    /// Fetch the blob stored under `key`, or `None` when nothing was ever
    /// saved there. Backend failures come back as `Err`, which callers treat
    /// the same as absence.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous blob.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
