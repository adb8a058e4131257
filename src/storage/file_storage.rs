use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::storage::base_storage::KeyValueStore;
use crate::{AvatarError, Result};

const LOG_PREFIX: &str = "[file-store]";
const VALUE_EXTENSION: &str = "json";
const TEMP_NAME_LENGTH: usize = 10;

/// Temporary file next to the destination, removed on drop unless it
/// was renamed into place.
struct TmpFile {
    file: File,
    path: PathBuf,
}

impl TmpFile {
    fn create_in(dir: &Path) -> Result<Self> {
        let filename: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(TEMP_NAME_LENGTH)
            .collect();
        let path = dir.join(format!(".{}.tmp", filename));
        let file = File::create(&path)?;
        Ok(Self { file, path })
    }

    fn persist(self, dest: &Path) -> Result<()> {
        self.file.sync_data()?;
        fs::rename(&self.path, dest)?;
        Ok(())
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Stores every key as its own file under a root directory.
///
/// A write never leaves a half-written value behind: data goes to a
/// temporary file first, which then replaces the old value by rename.
#[derive(Clone, Debug)]
pub struct FileStore {
    label: String,
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store with a diagnostic label and root directory
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
        {
            return Err(AvatarError::Storage(
                self.label.clone(),
                format!("Invalid key `{}`", key),
            ));
        }
        Ok(self
            .root
            .join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                log::debug!(
                    "{} {} read {} bytes from {}",
                    LOG_PREFIX,
                    self.label,
                    bytes.len(),
                    path.display()
                );
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.root)?;

        let tmp = TmpFile::create_in(&self.root)?;
        (&tmp.file).write_all(value)?;
        tmp.persist(&path)?;

        log::info!(
            "{} {} {} bytes have been written under `{}`",
            LOG_PREFIX,
            self.label,
            value.len(),
            key
        );
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AvatarError::Storage(
                self.label.clone(),
                err.to_string(),
            )),
        }
    }
}
