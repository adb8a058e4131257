pub mod base_storage;
pub mod file_storage;
pub mod memory_storage;

pub use base_storage::KeyValueStore;
pub use file_storage::FileStore;
pub use memory_storage::MemoryStore;
