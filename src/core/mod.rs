//! Core module containing the preference model, assembly and error types

pub mod assembly;
pub mod criteria;
pub mod error;
pub mod preferences;
pub mod service;
pub mod validation;

pub use assembly::{CriteriaForm, NAME_REQUIRED_MESSAGE, assemble_filters, is_truthy};
pub use criteria::{DateRange, FilterMap, FilterValue, SearchCriteria};
pub use error::{ApiError, ConfigError, PreferenceError, PreferenceResult, ValidationError};
pub use preferences::{SavedSearch, UserPreferences};
pub use service::PreferenceStore;
