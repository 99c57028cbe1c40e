// Durable client-side key/value storage for the bearer token

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

/// Small string key/value store that survives client restarts
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        fs::write(&self.path, contents)
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let _guard = lock(&self.write_lock);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = lock(&self.write_lock);
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let _guard = lock(&self.write_lock);
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Non-durable storage, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    values: Mutex<HashMap<String, String>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileTokenStorage::new(&path);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        storage.set(TOKEN_KEY, "abc.def.ghi").unwrap();
        storage.set("theme", "dark").unwrap();

        let reopened = FileTokenStorage::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc.def.ghi"));

        reopened.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileTokenStorage::new(&path);
        let err = storage.get(TOKEN_KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryTokenStorage::default();
        storage.set(TOKEN_KEY, "t").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t"));
        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }
}
