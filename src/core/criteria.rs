//! Search criteria exchanged with the preferences backend
//!
//! A [`SearchCriteria`] is a free-text query plus an ordered map of filter
//! constraints. Filter values are a closed set of kinds ([`FilterValue`]) but
//! travel as the plain JSON the backend already stores: strings, numbers,
//! booleans, string lists, date ranges and nested objects.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Date format used for date-range bounds on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered filter map, keyed by filter name
pub type FilterMap = IndexMap<String, FilterValue>;

/// Deserialize a missing or `null` field as its default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Convert and insert one filter; values that are not filters are logged and skipped
pub(crate) fn insert_filter(filters: &mut FilterMap, key: String, value: Value) {
    match FilterValue::try_from(value) {
        Ok(filter) => {
            filters.insert(key, filter);
        }
        Err(e) => tracing::warn!(field = %key, "skipping filter: {}", e),
    }
}

/// Deserialize a filter map, dropping entries that are not filter values
///
/// A missing or `null` map decodes as empty.
fn lenient_filters<'de, D>(deserializer: D) -> Result<FilterMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;

    let mut filters = FilterMap::new();
    for (key, value) in raw.unwrap_or_default() {
        insert_filter(&mut filters, key, value);
    }
    Ok(filters)
}

/// Inclusive date range; at least one bound is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Create a range, returning `None` when both bounds are open
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            None
        } else {
            Some(Self { from, to })
        }
    }

    /// Check whether a date falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Why a JSON value cannot be used as a filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterValueError {
    #[error("null is not a filter value")]
    Null,

    #[error("list filters may only contain strings")]
    NonStringChoice,
}

/// A single filter constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FilterValue {
    /// Free text or a single selected option
    Text(String),
    /// Numeric constraint
    Number(Number),
    /// Toggle
    Flag(bool),
    /// Several selected options
    Choice(Vec<String>),
    /// Date window
    DateRange(DateRange),
    /// Any other structured constraint, stored verbatim
    Object(Map<String, Value>),
}

impl FilterValue {
    /// Name of the filter kind, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Text(_) => "text",
            FilterValue::Number(_) => "number",
            FilterValue::Flag(_) => "flag",
            FilterValue::Choice(_) => "choice",
            FilterValue::DateRange(_) => "date_range",
            FilterValue::Object(_) => "object",
        }
    }

    /// Render the value as a single query-parameter string
    ///
    /// Lists are comma-joined; ranges and objects are emitted as JSON.
    pub fn to_param(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Flag(b) => b.to_string(),
            FilterValue::Choice(items) => items.join(","),
            other => Value::from(other.clone()).to_string(),
        }
    }
}

/// An object is a date range when its only keys are `from`/`to` and every
/// present bound is a zero-padded `YYYY-MM-DD` date
fn parse_date_range(map: &Map<String, Value>) -> Option<DateRange> {
    if map.is_empty() || map.keys().any(|k| k != "from" && k != "to") {
        return None;
    }
    let bound = |key: &str| -> Option<Option<NaiveDate>> {
        match map.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) if s.len() == 10 => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Some)
            }
            Some(_) => None,
        }
    };
    DateRange::new(bound("from")?, bound("to")?)
}

impl TryFrom<Value> for FilterValue {
    type Error = FilterValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err(FilterValueError::Null),
            Value::Bool(b) => Ok(FilterValue::Flag(b)),
            Value::Number(n) => Ok(FilterValue::Number(n)),
            Value::String(s) => Ok(FilterValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(FilterValueError::NonStringChoice),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FilterValue::Choice),
            Value::Object(map) => Ok(match parse_date_range(&map) {
                Some(range) => FilterValue::DateRange(range),
                None => FilterValue::Object(map),
            }),
        }
    }
}

impl From<FilterValue> for Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => Value::String(s),
            FilterValue::Number(n) => Value::Number(n),
            FilterValue::Flag(b) => Value::Bool(b),
            FilterValue::Choice(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            FilterValue::DateRange(range) => {
                let mut map = Map::new();
                if let Some(from) = range.from {
                    map.insert("from".into(), Value::String(from.format(DATE_FORMAT).to_string()));
                }
                if let Some(to) = range.to {
                    map.insert("to".into(), Value::String(to.format(DATE_FORMAT).to_string()));
                }
                Value::Object(map)
            }
            FilterValue::Object(map) => Value::Object(map),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Flag(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::Choice(items)
    }
}

impl From<DateRange> for FilterValue {
    fn from(range: DateRange) -> Self {
        FilterValue::DateRange(range)
    }
}

/// A query plus filter constraints and optional sorting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Free-text query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Filter constraints, in the order they were entered
    #[serde(default, deserialize_with = "lenient_filters")]
    pub filters: FilterMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,

    /// Search name, when the form carries it alongside the criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order.into());
        self
    }

    /// True when neither a query nor any filter is set
    pub fn is_empty(&self) -> bool {
        self.query.as_deref().is_none_or(|q| q.trim().is_empty()) && self.filters.is_empty()
    }
}
