//! In-memory implementation of PreferenceStore for testing and development

use crate::core::{PreferenceStore, SavedSearch, UserPreferences};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A stored preference document with bookkeeping timestamps
#[derive(Debug, Clone)]
pub struct StoredPreferences {
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredPreferences {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            preferences: UserPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// In-memory preference store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryPreferenceStore {
    documents: Arc<RwLock<HashMap<String, StoredPreferences>>>,
}

impl InMemoryPreferenceStore {
    /// Create a new in-memory preference store
    pub fn new() -> Self {
        Self::default()
    }

    /// Full stored record, including timestamps
    pub fn record(&self, user_id: &str) -> Result<Option<StoredPreferences>> {
        let documents = self
            .documents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(documents.get(user_id).cloned())
    }

    /// Number of users with a stored document
    pub fn user_count(&self) -> Result<usize> {
        let documents = self
            .documents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(documents.len())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        Ok(self.record(user_id)?.map(|stored| stored.preferences))
    }

    async fn save_search(&self, user_id: &str, search: SavedSearch) -> Result<SavedSearch> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let stored = documents
            .entry(user_id.to_string())
            .or_insert_with(StoredPreferences::new);
        stored.preferences.upsert_search(search.clone());
        stored.touch();

        Ok(search)
    }

    async fn save_columns(&self, user_id: &str, columns: Vec<String>) -> Result<UserPreferences> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let stored = documents
            .entry(user_id.to_string())
            .or_insert_with(StoredPreferences::new);
        stored.preferences.display_columns = columns;
        stored.touch();

        Ok(stored.preferences.clone())
    }

    async fn delete_search(&self, user_id: &str, name: &str) -> Result<Option<UserPreferences>> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(stored) = documents.get_mut(user_id) else {
            return Ok(None);
        };
        if stored.preferences.remove_search(name) {
            stored.touch();
        }

        Ok(Some(stored.preferences.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SearchCriteria;

    fn search(name: &str, file_type: &str) -> SavedSearch {
        SavedSearch::new(name, SearchCriteria::new().with_filter("fileType", file_type))
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_none() {
        let store = InMemoryPreferenceStore::new();
        assert!(store.get("nobody").await.unwrap().is_none());
        assert_eq!(store.user_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_search_creates_document() {
        let store = InMemoryPreferenceStore::new();
        let saved = store.save_search("alice", search("My Search", "pdf")).await.unwrap();
        assert_eq!(saved.name, "My Search");

        let prefs = store.get("alice").await.unwrap().unwrap();
        assert_eq!(prefs.search_names(), vec!["My Search"]);
        assert!(prefs.display_columns.is_empty());
    }

    #[tokio::test]
    async fn test_save_search_same_name_replaces() {
        let store = InMemoryPreferenceStore::new();
        store.save_search("alice", search("a", "pdf")).await.unwrap();
        store.save_search("alice", search("b", "pdf")).await.unwrap();
        store.save_search("alice", search("a", "docx")).await.unwrap();

        let prefs = store.get("alice").await.unwrap().unwrap();
        assert_eq!(prefs.search_names(), vec!["a", "b"]);
        assert_eq!(
            prefs.find_search("a").unwrap().criteria,
            SearchCriteria::new().with_filter("fileType", "docx")
        );
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = InMemoryPreferenceStore::new();
        store.save_search("alice", search("a", "pdf")).await.unwrap();
        store
            .save_columns("bob", vec!["type".to_string()])
            .await
            .unwrap();

        let alice = store.get("alice").await.unwrap().unwrap();
        let bob = store.get("bob").await.unwrap().unwrap();
        assert!(alice.display_columns.is_empty());
        assert!(bob.saved_searches.is_empty());
        assert_eq!(store.user_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_columns_updates_timestamp() {
        let store = InMemoryPreferenceStore::new();
        store.save_search("alice", search("a", "pdf")).await.unwrap();
        let before = store.record("alice").unwrap().unwrap();

        let prefs = store
            .save_columns("alice", vec!["type".to_string(), "date".to_string()])
            .await
            .unwrap();
        assert_eq!(prefs.display_columns, vec!["type", "date"]);
        assert_eq!(prefs.search_names(), vec!["a"]);

        let after = store.record("alice").unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_delete_search() {
        let store = InMemoryPreferenceStore::new();
        assert!(store.delete_search("alice", "a").await.unwrap().is_none());

        store.save_search("alice", search("a", "pdf")).await.unwrap();
        store.save_search("alice", search("b", "pdf")).await.unwrap();

        let prefs = store.delete_search("alice", "a").await.unwrap().unwrap();
        assert_eq!(prefs.search_names(), vec!["b"]);

        let prefs = store.delete_search("alice", "missing").await.unwrap().unwrap();
        assert_eq!(prefs.search_names(), vec!["b"]);
    }
}
