//! File-backed key-value storage
//!
//! Each key is one file, `<dir>/<key>.json`, holding the whole value.
//! Reads take a shared lock; writes go to a temp file under an exclusive
//! lock and are renamed over the target, so readers never see a half
//! written value.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::backend::{validate_key, KeyValueStore, StorageError};

/// Store that keeps one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that backs `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn lock_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Lock {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };

        file.lock_shared().map_err(lock_error(&path))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error(&path))?;

        // Lock is released when file is dropped
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StorageError::InvalidUtf8 { path })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);

        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let temp_path = path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(io_error(&temp_path))?;

            file.lock_exclusive().map_err(lock_error(&temp_path))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(value.as_bytes())
                .map_err(io_error(&temp_path))?;
            writer.flush().map_err(io_error(&temp_path))?;
            drop(writer);
            file.sync_all().map_err(io_error(&temp_path))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(io_error(&path))?;

        Ok(())
    }
}
