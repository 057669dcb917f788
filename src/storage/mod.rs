//! Storage implementations for the reference preferences service

pub mod in_memory;

pub use in_memory::{InMemoryPreferenceStore, StoredPreferences};
