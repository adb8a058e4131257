use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{
    AvatarCodec, DEFAULT_MAX_NAME_CHARS, DEFAULT_PAYLOAD_CAPACITY,
};
use crate::qr::{QrAdapter, DEFAULT_QR_SIZE};
use crate::storage::FileStore;
use crate::store::AVATARS_STORAGE_KEY;
use crate::{AvatarError, Result, APP_FOLDER};

/// Storage location, payload limits and QR size.
///
/// Every field has a default, so a config file only needs to list what
/// it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub max_name_chars: usize,
    pub payload_capacity: usize,
    pub qr_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        let storage_dir = match dirs::data_dir() {
            Some(dir) => dir.join(APP_FOLDER),
            None => PathBuf::from(".").join(format!(".{}", APP_FOLDER)),
        };
        Self {
            storage_dir,
            storage_key: AVATARS_STORAGE_KEY.to_owned(),
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
            payload_capacity: DEFAULT_PAYLOAD_CAPACITY,
            qr_size: DEFAULT_QR_SIZE,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|err| {
            AvatarError::Storage(path.display().to_string(), err.to_string())
        })
    }

    pub fn codec(&self) -> AvatarCodec {
        AvatarCodec::new(self.max_name_chars, self.payload_capacity)
    }

    pub fn qr(&self) -> QrAdapter {
        QrAdapter::new(self.codec())
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(APP_FOLDER, &self.storage_dir)
    }
}
