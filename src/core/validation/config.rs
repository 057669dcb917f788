//! Per-payload validation configuration

use crate::core::error::FieldValidationError;
use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type Filter = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// Validators and filters attached to the fields of one payload type
///
/// Filters run first (in registration order), then every validator of every
/// field runs and all failures are collected.
#[derive(Clone)]
pub struct PayloadRules {
    pub payload_type: String,
    validators: IndexMap<String, Vec<Validator>>,
    filters: IndexMap<String, Vec<Filter>>,
}

impl PayloadRules {
    pub fn new(payload_type: impl Into<String>) -> Self {
        Self {
            payload_type: payload_type.into(),
            validators: IndexMap::new(),
            filters: IndexMap::new(),
        }
    }

    /// Add a validator for a field
    pub fn add_validator<F>(&mut self, field: &str, validator: F)
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(validator));
    }

    /// Add a filter for a field
    pub fn add_filter<F>(&mut self, field: &str, filter: F)
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.filters
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(filter));
    }

    /// Builder-style [`PayloadRules::add_validator`]
    pub fn validator<F>(mut self, field: &str, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.add_validator(field, validator);
        self
    }

    /// Builder-style [`PayloadRules::add_filter`]
    pub fn filter<F>(mut self, field: &str, filter: F) -> Self
    where
        F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.add_filter(field, filter);
        self
    }

    /// Filter then validate a JSON object payload
    ///
    /// Missing fields are validated as `null`. A non-object payload is
    /// reported as a single error on the payload type.
    pub fn validate_and_filter(
        &self,
        mut payload: Value,
    ) -> Result<Value, Vec<FieldValidationError>> {
        let Some(object) = payload.as_object_mut() else {
            return Err(vec![FieldValidationError {
                field: self.payload_type.clone(),
                message: "payload must be a JSON object".to_string(),
            }]);
        };

        let mut errors = Vec::new();

        for (field, filters) in &self.filters {
            let Some(mut value) = object.remove(field) else {
                continue;
            };
            for filter in filters {
                match filter(field, value.clone()) {
                    Ok(filtered) => value = filtered,
                    Err(e) => errors.push(FieldValidationError {
                        field: field.clone(),
                        message: e.to_string(),
                    }),
                }
            }
            object.insert(field.clone(), value);
        }

        for (field, validators) in &self.validators {
            let value = object.get(field).cloned().unwrap_or(Value::Null);
            for validator in validators {
                if let Err(message) = validator(field, &value) {
                    errors.push(FieldValidationError {
                        field: field.clone(),
                        message,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{filters, validators};
    use serde_json::json;

    fn name_rules() -> PayloadRules {
        PayloadRules::new("saved_search")
            .filter("name", filters::trim())
            .validator("name", validators::required_text())
            .validator("name", validators::string_length(1, 10))
    }

    #[test]
    fn test_filters_apply_before_validation() {
        let result = name_rules()
            .validate_and_filter(json!({"name": "  short  ", "criteria": {}}))
            .unwrap();
        assert_eq!(result["name"], "short");
        assert_eq!(result["criteria"], json!({}));
    }

    #[test]
    fn test_all_failures_are_collected() {
        let errors = name_rules()
            .validate_and_filter(json!({"name": "   "}))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field == "name"));
    }

    #[test]
    fn test_missing_field_validated_as_null() {
        let errors = name_rules().validate_and_filter(json!({})).unwrap_err();
        assert_eq!(errors[0].message, "'name' is required");
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let errors = name_rules()
            .validate_and_filter(json!(["not", "an", "object"]))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "saved_search");
    }
}
