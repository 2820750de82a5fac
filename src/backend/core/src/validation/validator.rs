//! Validator builders.
//!
//! - `Validate` trait for types that can check themselves
//! - `FieldValidator` for applying rules to one field
//! - `RequestValidator` for collecting errors across a whole input

use crate::validation::error::{FieldError, ValidationErrors, ValidationResult};
use crate::validation::rules::ValidationRule;

// ═══════════════════════════════════════════════════════════════════════════════
// Validate Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for types that can be validated.
pub trait Validate {
    /// Validate this object and return any validation errors.
    fn validate(&self) -> ValidationResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate and return self if valid, otherwise return errors.
    fn validated(self) -> ValidationResult<Self>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field Validator
// ═══════════════════════════════════════════════════════════════════════════════

/// A builder for validating a single field with multiple rules.
pub struct FieldValidator<'a, T: ?Sized> {
    field_name: &'a str,
    value: &'a T,
    errors: Vec<FieldError>,
}

impl<'a, T: ?Sized> FieldValidator<'a, T> {
    pub fn new(field_name: &'a str, value: &'a T) -> Self {
        Self {
            field_name,
            value,
            errors: Vec::new(),
        }
    }

    /// Apply a validation rule.
    pub fn rule<R: ValidationRule<T>>(mut self, rule: R) -> Self {
        if let Some(error) = rule.validate(self.value) {
            self.errors.push(error);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add the field's errors to a ValidationErrors collection.
    pub fn collect_into(self, errors: &mut ValidationErrors) {
        for error in self.errors {
            errors.add(self.field_name, error);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Request Validator
// ═══════════════════════════════════════════════════════════════════════════════

/// A builder for validating an entire input.
#[derive(Default)]
pub struct RequestValidator {
    errors: ValidationErrors,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a field and collect any errors.
    pub fn field<T: ?Sized>(mut self, validator: FieldValidator<'_, T>) -> Self {
        validator.collect_into(&mut self.errors);
        self
    }

    /// `Ok(())` if no errors were collected.
    pub fn result(self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Create a FieldValidator for a field.
pub fn validate_field<'a, T: ?Sized>(field_name: &'a str, value: &'a T) -> FieldValidator<'a, T> {
    FieldValidator::new(field_name, value)
}

/// Create a new RequestValidator.
pub fn validate_request() -> RequestValidator {
    RequestValidator::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::{Email, Required};

    #[test]
    fn test_field_validator_collects_all_errors() {
        let value = "   ".to_string();
        let mut errors = ValidationErrors::new();
        validate_field("email", &value)
            .rule(Required)
            .rule(Email)
            .collect_into(&mut errors);
        assert_eq!(errors.error_count(), 2);
    }

    #[test]
    fn test_request_validator_result() {
        let ok = "Ada".to_string();
        let empty = String::new();

        assert!(validate_request()
            .field(validate_field("name", &ok).rule(Required))
            .result()
            .is_ok());

        let err = validate_request()
            .field(validate_field("name", &ok).rule(Required))
            .field(validate_field("description", &empty).rule(Required))
            .result()
            .unwrap_err();
        assert!(err.has_errors("description"));
        assert!(!err.has_errors("name"));
    }
}
