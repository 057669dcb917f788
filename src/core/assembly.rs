//! Form state to search criteria and back
//!
//! Form controls hold loosely typed values. Before a search is saved or run,
//! incomplete fields (anything falsy: `""`, `null`, `false`, `0`, `[]`) are
//! dropped and the rest become typed
//! [`FilterValue`](super::criteria::FilterValue)s. Assembly never fails.

use super::criteria::{FilterMap, SearchCriteria, insert_filter};
use super::error::ValidationError;
use super::preferences::SavedSearch;
use super::validation::{PayloadRules, filters, validators};
use indexmap::IndexMap;
use reqwest::Url;
use serde_json::{Value, json};

/// Message shown when a search is saved without a name
pub const NAME_REQUIRED_MESSAGE: &str = "Please enter a name for your search";

/// JavaScript-style truthiness of a form value
///
/// Empty lists count as falsy: an empty multi-select constrains nothing.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Keep the truthy fields and convert them to filter values, in input order
///
/// Values that are not expressible as a filter are skipped.
pub fn assemble_filters<I, K>(fields: I) -> FilterMap
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut filters = FilterMap::new();
    for (key, value) in fields {
        if !is_truthy(&value) {
            continue;
        }
        insert_filter(&mut filters, key.into(), value);
    }
    filters
}

fn save_rules() -> PayloadRules {
    PayloadRules::new("saved_search")
        .filter("name", filters::trim())
        .validator("name", validators::required_text())
}

/// Search form state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaForm {
    pub query: String,
    /// Raw control values, in display order
    pub fields: IndexMap<String, Value>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl CriteriaForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with the given controls, all empty
    pub fn with_fields<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            fields: keys
                .into_iter()
                .map(|k| (k.into(), Value::String(String::new())))
                .collect(),
            ..Self::default()
        }
    }

    /// Set a control's value, adding the control if unknown
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Assemble the criteria for the current form state
    pub fn to_criteria(&self) -> SearchCriteria {
        let query = self.query.trim();
        SearchCriteria {
            query: (!query.is_empty()).then(|| query.to_string()),
            filters: assemble_filters(self.fields.iter().map(|(k, v)| (k.clone(), v.clone()))),
            sort_by: self.sort_by.clone().filter(|s| !s.is_empty()),
            sort_order: self.sort_order.clone().filter(|s| !s.is_empty()),
            name: None,
        }
    }

    /// Load a saved search back into the form
    ///
    /// Every known control is cleared first, so fields absent from the
    /// criteria do not keep stale values.
    pub fn apply(&mut self, criteria: &SearchCriteria) {
        for value in self.fields.values_mut() {
            *value = Value::String(String::new());
        }
        for (key, filter) in &criteria.filters {
            self.fields.insert(key.clone(), Value::from(filter.clone()));
        }
        self.query = criteria.query.clone().unwrap_or_default();
        self.sort_by = criteria.sort_by.clone();
        self.sort_order = criteria.sort_order.clone();
    }

    /// Build the search to hand to the preference client
    ///
    /// The name is trimmed; a blank name yields [`NAME_REQUIRED_MESSAGE`].
    pub fn prepare_save(&self, name: &str) -> Result<SavedSearch, ValidationError> {
        let checked = save_rules()
            .validate_and_filter(json!({ "name": name }))
            .map_err(|_| ValidationError::FieldError {
                field: "name".to_string(),
                message: NAME_REQUIRED_MESSAGE.to_string(),
            })?;
        let name = checked["name"].as_str().unwrap_or_default().to_string();
        Ok(SavedSearch::new(name, self.to_criteria()))
    }

    /// Query parameters for running the search: truthy values only
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        criteria_query_pairs(&self.to_criteria())
    }

    /// `base` with the search's query parameters appended
    pub fn search_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let pairs = self.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }
}

/// Query parameter names owned by the criteria themselves
const RESERVED_PARAMS: [&str; 3] = ["query", "sortBy", "sortOrder"];

/// Query parameters for assembled criteria
///
/// Filters named like a reserved parameter are left out, so each name
/// appears at most once.
pub fn criteria_query_pairs(criteria: &SearchCriteria) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(query) = &criteria.query {
        pairs.push(("query".to_string(), query.clone()));
    }
    for (key, value) in &criteria.filters {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            tracing::warn!(field = %key, "filter shadows a reserved query parameter; skipped");
            continue;
        }
        pairs.push((key.clone(), value.to_param()));
    }
    if let Some(sort_by) = &criteria.sort_by {
        pairs.push(("sortBy".to_string(), sort_by.clone()));
    }
    if let Some(sort_order) = &criteria.sort_order {
        pairs.push(("sortOrder".to_string(), sort_order.clone()));
    }
    pairs
}
