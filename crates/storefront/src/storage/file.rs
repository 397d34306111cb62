//! File-backed storage backend.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a crash never
//! leaves a half-written cart behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CartStorage, StorageError};

/// Directory of JSON slot files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the profile directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The profile directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` unless the key is non-empty, does
    /// not start with `.`, and only contains ASCII letters, digits, `-`, `_`
    /// or `.`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn write_and_rename(tmp_path: &Path, path: &Path, value: &str) -> Result<(), StorageError> {
    let mut tmp_file = fs::File::create(tmp_path).map_err(|e| io_error(tmp_path, e))?;
    tmp_file
        .write_all(value.as_bytes())
        .map_err(|e| io_error(tmp_path, e))?;
    tmp_file.sync_all().map_err(|e| io_error(tmp_path, e))?;
    drop(tmp_file);

    fs::rename(tmp_path, path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl CartStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        if let Err(e) = write_and_rename(&tmp_path, &path, value) {
            // Leave no temp file behind.
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        assert_eq!(storage.get_item("cart-storage").unwrap(), None);
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("profile");
        let storage = FileStorage::new(&dir);

        storage.set_item("cart-storage", "{\"a\":1}").unwrap();

        let path = dir.join("cart-storage.json");
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"a\":1}");
        assert!(!dir.join(".cart-storage.json.tmp").exists());
    }

    #[test]
    fn test_overwrite_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set_item("cart", "one").unwrap();
        storage.set_item("cart", "two").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("two"));

        storage.remove_item("cart").unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
        storage.remove_item("cart").unwrap();
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        // A non-empty directory where the slot file should go makes the rename fail.
        let blocker = temp_dir.path().join("cart-storage.json");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = storage.set_item("cart-storage", "{}").unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!temp_dir.path().join(".cart-storage.json.tmp").exists());
    }

    #[test]
    fn test_rejects_unsafe_keys() {
        let storage = FileStorage::new("/tmp/unused");
        for key in ["", "../escape", ".hidden", "a/b", "sp ace"] {
            assert!(
                matches!(storage.path_for(key), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(storage.path_for("cart-storage.v2").is_ok());
    }
}
