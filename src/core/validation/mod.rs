//! Validation and filtering system
//!
//! Payloads are normalized by filters and checked by validators before they
//! reach a handler or leave a form. The same rules back the reference
//! service's extractor and the client-side save check.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::PayloadRules;
pub use extractor::{ValidatedJson, ValidatedPayload};
