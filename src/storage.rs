//! Key-value storage backends the task collection is persisted into

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{TaskError, TaskResult};

/// A string key-value store, such as a browser's local storage.
///
/// There is no transactionality: the last write wins.
pub trait KeyValueStorage {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, overwriting any previous value
    fn set(&mut self, key: &str, value: String) -> TaskResult<()>;
}


/// A storage that only lives in memory
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> TaskResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}


/// A storage that keeps every key in its own file, in a given folder
#[derive(Clone, Debug, PartialEq)]
pub struct FileStorage {
    backing_folder: PathBuf,
}

impl FileStorage {
    /// Use `folder` to store values. It is created on the first write if needed.
    pub fn new(folder: &Path) -> Self {
        Self { backing_folder: PathBuf::from(folder) }
    }

    pub fn folder(&self) -> &Path {
        &self.backing_folder
    }

    /// The file that holds the value for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name = sanitize_filename::sanitize(key) + ".json";
        self.backing_folder.join(file_name)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Unable to read file {:?}: {}", path, err);
                None
            },
        }
    }

    fn set(&mut self, key: &str, value: String) -> TaskResult<()> {
        std::fs::create_dir_all(&self.backing_folder)
            .map_err(|err| TaskError::storage(format!("unable to create folder {:?}: {}", self.backing_folder, err)))?;

        // Write aside then rename, so that an interrupted write never leaves a truncated value
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value)
            .map_err(|err| TaskError::storage(format!("unable to write file {:?}: {}", temp_path, err)))?;
        std::fs::rename(&temp_path, &path)
            .map_err(|err| TaskError::storage(format!("unable to replace file {:?}: {}", path, err)))
    }
}
