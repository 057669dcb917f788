//! Storage trait behind the reference preferences service

use crate::core::{SavedSearch, UserPreferences};
use anyhow::Result;
use async_trait::async_trait;

/// Per-user preference storage
///
/// Implementations own one preference document per user id. Writes for the
/// same user are applied in arrival order; the last write wins.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get a user's preferences, `None` when nothing was ever stored
    async fn get(&self, user_id: &str) -> Result<Option<UserPreferences>>;

    /// Insert or replace a saved search by name, creating the document if needed
    async fn save_search(&self, user_id: &str, search: SavedSearch) -> Result<SavedSearch>;

    /// Replace the display column order, creating the document if needed
    async fn save_columns(&self, user_id: &str, columns: Vec<String>) -> Result<UserPreferences>;

    /// Remove a saved search by name
    ///
    /// Returns `None` when the user has no document.
    async fn delete_search(&self, user_id: &str, name: &str) -> Result<Option<UserPreferences>>;
}
