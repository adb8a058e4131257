use crate::Result;

/// Persistent key-value mechanism backing the avatar collection and the
/// preferences.
///
/// Values are opaque bytes and every write replaces the whole value.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if nothing was written yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite the value stored under `key`.
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key`. Absent keys are not an error.
    fn erase(&mut self, key: &str) -> Result<()>;
}
