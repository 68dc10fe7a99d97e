// Favorites - A watchlist persisted to a key-value store on every change
use crate::domain::watchlist::{Keyed, Watchlist};
use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Synchronous string store keyed by name. Read once at startup, written on mutation.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub struct Favorites<T> {
    key: String,
    store: Arc<dyn KeyValueStore>,
    list: Watchlist<T>,
}

impl<T> Favorites<T>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    /// Missing or unreadable stored state starts an empty list.
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let list = match store.read(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => Watchlist::from_items(items),
                Err(e) => {
                    tracing::warn!("Discarding unreadable favorites under '{}': {}", key, e);
                    Watchlist::new()
                }
            },
            Ok(None) => Watchlist::new(),
            Err(e) => {
                tracing::warn!("Failed to read favorites '{}': {:#}", key, e);
                Watchlist::new()
            }
        };

        Self {
            key: key.to_string(),
            store,
            list,
        }
    }

    pub fn add(&mut self, item: T) -> anyhow::Result<bool> {
        let mut next = self.list.clone();
        let added = next.add(item);
        if added {
            self.commit(next)?;
        }
        Ok(added)
    }

    pub fn remove(&mut self, key: &str) -> anyhow::Result<Option<T>> {
        let mut next = self.list.clone();
        let removed = next.remove(key);
        if removed.is_some() {
            self.commit(next)?;
        }
        Ok(removed)
    }

    /// Returns true when the item is now a favorite.
    pub fn toggle(&mut self, item: T) -> anyhow::Result<bool> {
        let mut next = self.list.clone();
        let now_present = next.toggle(item);
        self.commit(next)?;
        Ok(now_present)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.list.contains(key)
    }

    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The in-memory list only changes once the store accepted the new state.
    fn commit(&mut self, next: Watchlist<T>) -> anyhow::Result<()> {
        let raw = serde_json::to_string(next.items()).context("Failed to serialize favorites")?;
        self.store
            .write(&self.key, &raw)
            .with_context(|| format!("Failed to persist favorites '{}'", self.key))?;
        self.list = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::astronomy::{FavoriteImage, MediaType};
    use crate::infrastructure::favorites_store::MemoryStore;

    fn image(id: &str) -> FavoriteImage {
        FavoriteImage {
            id: id.to_string(),
            title: format!("Picture {id}"),
            url: format!("https://apod.example/{id}.jpg"),
            media_type: MediaType::Image,
        }
    }

    #[test]
    fn test_round_trip_through_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());

        let mut favorites = Favorites::<FavoriteImage>::load(store.clone(), "nasa-favorites");
        assert!(favorites.is_empty());
        assert!(favorites.add(image("2024-03-01")).unwrap());
        assert!(!favorites.add(image("2024-03-01")).unwrap());
        assert!(favorites.toggle(image("2024-03-02")).unwrap());

        let reloaded = Favorites::<FavoriteImage>::load(store.clone(), "nasa-favorites");
        assert_eq!(reloaded.items(), favorites.items());
        assert!(reloaded.contains("2024-03-02"));
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let store = Arc::new(MemoryStore::default());
        store.write("nasa-favorites", "{not json").unwrap();

        let favorites = Favorites::<FavoriteImage>::load(store, "nasa-favorites");
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_remove_persists() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let mut favorites = Favorites::<FavoriteImage>::load(store.clone(), "nasa-favorites");
        favorites.add(image("a")).unwrap();
        favorites.add(image("b")).unwrap();
        assert!(favorites.remove("a").unwrap().is_some());

        let reloaded = Favorites::<FavoriteImage>::load(store, "nasa-favorites");
        assert_eq!(reloaded.len(), 1);
        assert!(!reloaded.contains("a"));
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("store is read-only: {key}")
        }
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let mut favorites = Favorites::<FavoriteImage>::load(Arc::new(ReadOnlyStore), "nasa-favorites");

        assert!(favorites.toggle(image("2024-03-01")).is_err());
        assert!(favorites.add(image("2024-03-02")).is_err());
        assert!(favorites.is_empty());
        assert!(!favorites.contains("2024-03-01"));
    }
}
