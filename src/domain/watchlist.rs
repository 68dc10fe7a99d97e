// Ordered, duplicate-free collection of tracked entities
use serde::{Deserialize, Serialize};

/// Anything that can be tracked by a stable key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for String {
    fn key(&self) -> &str {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist<T = String> {
    items: Vec<T>,
}

impl<T> Default for Watchlist<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> Watchlist<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a watchlist, keeping the first occurrence of each key.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.add(item);
        }
        list
    }

    /// Appends the item unless its key is already tracked. Returns whether it was added.
    pub fn add(&mut self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let idx = self.items.iter().position(|i| i.key() == key)?;
        Some(self.items.remove(idx))
    }

    /// Adds when absent, removes when present. Returns true if now tracked.
    pub fn toggle(&mut self, item: T) -> bool {
        if self.remove(item.key()).is_some() {
            false
        } else {
            self.items.push(item);
            true
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|i| i.key() == key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|i| i.key().to_string()).collect()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
