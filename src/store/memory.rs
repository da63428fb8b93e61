//! In-process store adapter. Used as the fallback when the SQLite store
//! cannot be opened (the session then runs ephemeral but fully functional)
//! and as the default backend in unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{StoreAdapter, StoreError};

/// Map-backed adapter with no durability. Interior mutability keeps the
/// [`StoreAdapter`] trait object shareable by `&` reference everywhere, which
/// matters because repositories hold no reference themselves and borrow the
/// store per call.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreAdapter for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
