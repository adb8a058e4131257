use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::KeyValueStore;
use crate::Result;

pub const PREFERENCES_STORAGE_KEY: &str = "preferences";

/// Small user settings kept next to the saved avatars.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub last_used_avatar_id: Option<Uuid>,
}

impl Preferences {
    /// Read the preferences, falling back to defaults when they are
    /// missing or unreadable.
    pub fn load<S: KeyValueStore>(storage: &S) -> Self {
        let bytes = match storage.read(PREFERENCES_STORAGE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Self::default(),
            Err(err) => {
                log::warn!("[preferences] failed to read: {}", err);
                return Self::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            log::warn!("[preferences] discarding unreadable data: {}", err);
            Self::default()
        })
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut S) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        storage.write(PREFERENCES_STORAGE_KEY, &bytes)
    }

    /// Forget every stored preference.
    pub fn reset<S: KeyValueStore>(storage: &mut S) -> Result<Self> {
        storage.erase(PREFERENCES_STORAGE_KEY)?;
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_when_missing() {
        let storage = MemoryStore::new();
        assert_eq!(Preferences::load(&storage), Preferences::default());
    }

    #[test]
    fn save_and_load() {
        let mut storage = MemoryStore::new();
        let prefs = Preferences {
            last_used_avatar_id: Some(Uuid::new_v4()),
        };
        prefs.save(&mut storage).unwrap();
        assert_eq!(Preferences::load(&storage), prefs);
    }

    #[test]
    fn corrupt_data_gives_defaults() {
        let mut storage = MemoryStore::new();
        storage
            .write(PREFERENCES_STORAGE_KEY, b"{oops")
            .unwrap();
        assert_eq!(Preferences::load(&storage), Preferences::default());
    }

    #[test]
    fn reset_erases() {
        let mut storage = MemoryStore::new();
        Preferences {
            last_used_avatar_id: Some(Uuid::new_v4()),
        }
        .save(&mut storage)
        .unwrap();

        let prefs = Preferences::reset(&mut storage).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert!(storage.is_empty());
    }
}
