use std::collections::BTreeMap;

use crate::storage::base_storage::KeyValueStore;
use crate::Result;

/// Keeps values in memory only. Useful for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
