// Key-value stores backing persisted favorites
use crate::application::favorites::KeyValueStore;
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a truncated file behind.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;
        tracing::debug!("Persisted '{}' to {}", key, path.display());
        Ok(())
    }
}

/// In-process store, for sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::favorites::Favorites;
    use crate::domain::astronomy::{FavoriteImage, MediaType};
    use std::sync::Arc;

    #[test]
    fn test_missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        assert_eq!(store.read("nasa-favorites").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.write("nasa-favorites", "[]").unwrap();
        store.write("nasa-favorites", "[1]").unwrap();

        assert_eq!(store.read("nasa-favorites").unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("nasa-favorites.json").exists());
        assert!(!dir.path().join("nasa-favorites.json.tmp").exists());
    }

    #[test]
    fn test_favorites_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let picture = FavoriteImage {
            id: "2024-03-01".to_string(),
            title: "Pillars of Creation".to_string(),
            url: "https://apod.nasa.gov/apod/image/pillars.jpg".to_string(),
            media_type: MediaType::Image,
        };

        {
            let store = Arc::new(JsonFileStore::new(dir.path()));
            let mut favorites = Favorites::<FavoriteImage>::load(store, "nasa-favorites");
            favorites.add(picture.clone()).unwrap();
            favorites.add(picture.clone()).unwrap();
        }

        let store = Arc::new(JsonFileStore::new(dir.path()));
        let mut favorites = Favorites::<FavoriteImage>::load(store, "nasa-favorites");
        assert_eq!(favorites.items(), &[picture.clone()]);

        favorites.remove(&picture.id).unwrap();
        assert!(favorites.is_empty());
    }
}
