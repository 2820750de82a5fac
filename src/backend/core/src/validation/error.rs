//! Validation error types with field-level error support.
//!
//! Errors are keyed by field name and kept in field order, so rendered
//! messages are stable from run to run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// Validation Error Types
// ═══════════════════════════════════════════════════════════════════════════════

/// The kind of validation error that occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Field is required but was missing or empty.
    Required,
    /// Value does not match the expected email format.
    InvalidEmail,
    /// Value is not in the allowed set.
    NotInSet { allowed: Vec<String> },
    /// Collection contains duplicate items.
    DuplicateItems,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "field is required"),
            Self::InvalidEmail => write!(f, "must be a valid email address"),
            Self::NotInSet { allowed } => {
                write!(f, "must be one of: {}", allowed.join(", "))
            }
            Self::DuplicateItems => write!(f, "must not contain duplicate items"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field Error
// ═══════════════════════════════════════════════════════════════════════════════

/// A single validation error for a specific field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ValidationErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    pub fn with_message(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validation Errors Collection
// ═══════════════════════════════════════════════════════════════════════════════

/// A collection of validation errors organized by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of errors across all fields.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.errors.entry(field.into()).or_default().push(error);
    }

    /// Add an error with just the kind (auto-generates message).
    pub fn add_error(&mut self, field: impl Into<String>, kind: ValidationErrorKind) {
        self.add(field, FieldError::new(kind));
    }

    pub fn add_required(&mut self, field: impl Into<String>) {
        self.add_error(field, ValidationErrorKind::Required);
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn has_errors(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|v| !v.is_empty())
    }

    /// Field names that have errors, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Convert to a simple map of field -> error messages.
    pub fn to_message_map(&self) -> HashMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, errors)| {
                (
                    field.clone(),
                    errors.iter().map(|e| e.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// Flat list of `field: message` lines.
    pub fn to_flat_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| format!("{}: {}", field, e.message))
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_flat_messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Result type for validation operations.
pub type ValidationResult<T> = std::result::Result<T, ValidationErrors>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add_required("name");
        errors.add_error("email", ValidationErrorKind::InvalidEmail);
        errors.add_required("email");

        assert_eq!(errors.error_count(), 3);
        assert!(errors.has_errors("email"));
        assert!(!errors.has_errors("role_id"));
        assert_eq!(errors.get("email").map(<[FieldError]>::len), Some(2));
    }

    #[test]
    fn test_flat_messages_are_field_ordered() {
        let mut errors = ValidationErrors::new();
        errors.add_required("name");
        errors.add_error("email", ValidationErrorKind::InvalidEmail);

        assert_eq!(
            errors.to_string(),
            "email: must be a valid email address; name: field is required"
        );
    }

    #[test]
    fn test_not_in_set_message() {
        let kind = ValidationErrorKind::NotInSet {
            allowed: vec!["view".into(), "edit".into()],
        };
        assert_eq!(kind.to_string(), "must be one of: view, edit");
    }

    #[test]
    fn test_fields_are_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add_required("name");
        errors.add_required("description");
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["description", "name"]);
    }
}
