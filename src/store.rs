use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Avatar;
use crate::storage::KeyValueStore;
use crate::{AvatarError, Result};

const LOG_PREFIX: &str = "[avatar-store]";
const STORAGE_VERSION: i32 = 1;

pub const AVATARS_STORAGE_KEY: &str = "savedAvatars";

/// What gets written under the storage key.
#[derive(Serialize, Deserialize)]
struct AvatarStoreData {
    version: i32,
    avatars: Vec<Avatar>,
}

/// Saved avatars in display order, mirrored to a [`KeyValueStore`]
/// after every change.
pub struct AvatarStore<S: KeyValueStore> {
    storage: S,
    key: String,
    avatars: Vec<Avatar>,
}

impl<S: KeyValueStore> AvatarStore<S> {
    /// Load the collection stored under [`AVATARS_STORAGE_KEY`].
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, AVATARS_STORAGE_KEY)
    }

    /// Load the collection stored under `key`.
    ///
    /// Missing or unreadable data gives an empty collection. The problem
    /// is logged and the next save overwrites it.
    pub fn load_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let avatars = match read_avatars(&storage, &key) {
            Ok(avatars) => avatars,
            Err(err) => {
                log::warn!(
                    "{} discarding stored avatars under `{}`: {}",
                    LOG_PREFIX,
                    key,
                    err
                );
                Vec::new()
            }
        };
        log::info!("{} {} avatars loaded", LOG_PREFIX, avatars.len());

        Self {
            storage,
            key,
            avatars,
        }
    }

    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    pub fn get(&self, id: &Uuid) -> Option<&Avatar> {
        self.avatars.iter().find(|a| a.id == *id)
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Insert or update an avatar and persist the collection.
    ///
    /// An avatar whose id is already stored replaces that entry in place.
    /// Anything else is appended as a new record with a fresh id and
    /// creation date. Returns the id under which the avatar is stored.
    ///
    /// When persisting fails the in-memory collection keeps the change,
    /// so the next successful write catches up.
    pub fn save(&mut self, mut avatar: Avatar) -> Result<Uuid> {
        let id = match self
            .avatars
            .iter()
            .position(|a| a.id == avatar.id)
        {
            Some(index) => {
                let id = avatar.id;
                self.avatars[index] = avatar;
                log::debug!("{} updated {}", LOG_PREFIX, id);
                id
            }
            None => {
                avatar.reissue();
                let id = avatar.id;
                self.avatars.push(avatar);
                log::debug!("{} added {}", LOG_PREFIX, id);
                id
            }
        };
        self.persist()?;
        Ok(id)
    }

    /// Remove the avatar with the given id. Unknown ids are ignored.
    pub fn delete(&mut self, id: &Uuid) -> Result<()> {
        let before = self.avatars.len();
        self.avatars.retain(|a| a.id != *id);
        if self.avatars.len() == before {
            log::debug!("{} nothing to delete for {}", LOG_PREFIX, id);
            return Ok(());
        }
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let data = AvatarStoreData {
            version: STORAGE_VERSION,
            avatars: self.avatars.clone(),
        };
        let bytes = serde_json::to_vec(&data)?;
        self.storage.write(&self.key, &bytes)
    }
}

fn read_avatars<S: KeyValueStore>(
    storage: &S,
    key: &str,
) -> Result<Vec<Avatar>> {
    let bytes = match storage.read(key)? {
        Some(bytes) => bytes,
        None => return Ok(Vec::new()),
    };
    let data: AvatarStoreData = serde_json::from_slice(&bytes)
        .map_err(|err| AvatarError::Storage(key.to_owned(), err.to_string()))?;
    if data.version != STORAGE_VERSION {
        return Err(AvatarError::Storage(
            key.to_owned(),
            format!(
                "Storage version mismatch: expected {}, got {}",
                STORAGE_VERSION, data.version
            ),
        ));
    }

    let mut seen = HashSet::new();
    let mut avatars = data.avatars;
    avatars.retain(|a| seen.insert(a.id));
    Ok(avatars)
}
