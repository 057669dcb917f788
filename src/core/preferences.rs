//! Per-user preference documents

use super::criteria::{SearchCriteria, null_as_default};
use serde::{Deserialize, Serialize};

/// A named, persisted search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub criteria: SearchCriteria,
}

impl SavedSearch {
    pub fn new(name: impl Into<String>, criteria: SearchCriteria) -> Self {
        Self {
            name: name.into(),
            criteria,
        }
    }
}

/// Everything the backend stores for one user
///
/// `saved_searches` is kept in insertion order, which is also display order.
/// Missing or `null` fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, deserialize_with = "null_as_default")]
    pub saved_searches: Vec<SavedSearch>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub display_columns: Vec<String>,
}

impl UserPreferences {
    /// First saved search with the given name
    pub fn find_search(&self, name: &str) -> Option<&SavedSearch> {
        self.saved_searches.iter().find(|s| s.name == name)
    }

    /// Names of all saved searches, in display order
    pub fn search_names(&self) -> Vec<&str> {
        self.saved_searches.iter().map(|s| s.name.as_str()).collect()
    }

    /// Replace the search with the same name in place, or append it
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert_search(&mut self, search: SavedSearch) -> bool {
        match self.saved_searches.iter_mut().find(|s| s.name == search.name) {
            Some(existing) => {
                *existing = search;
                true
            }
            None => {
                self.saved_searches.push(search);
                false
            }
        }
    }

    /// Remove every search with the given name
    ///
    /// Returns `true` when something was removed.
    pub fn remove_search(&mut self, name: &str) -> bool {
        let before = self.saved_searches.len();
        self.saved_searches.retain(|s| s.name != name);
        self.saved_searches.len() != before
    }
}
