//! Validation rules used by the administrative forms.

use crate::validation::error::{FieldError, ValidationErrorKind};
use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::LazyLock;

/// Email format accepted by the user form. Case-insensitive.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("Invalid email regex")
});

/// Whether `value` is an email address the user form accepts.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// A validation rule that can be applied to a value.
pub trait ValidationRule<T: ?Sized> {
    /// Validate the value and return any error.
    fn validate(&self, value: &T) -> Option<FieldError>;

    /// Get a description of this rule.
    fn description(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Required
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates a field is present and not blank.
#[derive(Debug, Clone, Default)]
pub struct Required;

impl ValidationRule<String> for Required {
    fn validate(&self, value: &String) -> Option<FieldError> {
        if value.trim().is_empty() {
            Some(FieldError::new(ValidationErrorKind::Required))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        "required".to_string()
    }
}

impl<T: AsRef<str>> ValidationRule<Option<T>> for Required {
    fn validate(&self, value: &Option<T>) -> Option<FieldError> {
        match value {
            Some(v) if v.as_ref().trim().is_empty() => {
                Some(FieldError::new(ValidationErrorKind::Required))
            }
            _ => None,
        }
    }

    fn description(&self) -> String {
        "not blank when present".to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Format
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates email format. Empty values pass; pair with [`Required`].
#[derive(Debug, Clone, Default)]
pub struct Email;

impl ValidationRule<String> for Email {
    fn validate(&self, value: &String) -> Option<FieldError> {
        if value.is_empty() || is_valid_email(value) {
            None
        } else {
            Some(FieldError::new(ValidationErrorKind::InvalidEmail))
        }
    }

    fn description(&self) -> String {
        "valid email format".to_string()
    }
}

impl ValidationRule<Option<String>> for Email {
    fn validate(&self, value: &Option<String>) -> Option<FieldError> {
        match value {
            Some(s) => <Email as ValidationRule<String>>::validate(self, s),
            None => None,
        }
    }

    fn description(&self) -> String {
        "valid email format".to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sets
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates a string is one of a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<&'static str>,
}

impl OneOf {
    pub fn new(allowed: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    fn check(&self, value: &str) -> Option<FieldError> {
        if self.allowed.contains(&value) {
            None
        } else {
            Some(FieldError::new(ValidationErrorKind::NotInSet {
                allowed: self.allowed.iter().map(|v| v.to_string()).collect(),
            }))
        }
    }
}

impl ValidationRule<String> for OneOf {
    fn validate(&self, value: &String) -> Option<FieldError> {
        if value.is_empty() {
            return None;
        }
        self.check(value)
    }

    fn description(&self) -> String {
        format!("one of: {}", self.allowed.join(", "))
    }
}

impl ValidationRule<Option<String>> for OneOf {
    fn validate(&self, value: &Option<String>) -> Option<FieldError> {
        value.as_deref().and_then(|v| self.check(v))
    }

    fn description(&self) -> String {
        format!("one of: {}", self.allowed.join(", "))
    }
}

/// Rule that validates a collection has no repeated entries.
#[derive(Debug, Clone, Default)]
pub struct UniqueItems;

impl<T: Eq + Hash> ValidationRule<Vec<T>> for UniqueItems {
    fn validate(&self, value: &Vec<T>) -> Option<FieldError> {
        let mut seen = HashSet::with_capacity(value.len());
        if value.iter().all(|item| seen.insert(item)) {
            None
        } else {
            Some(FieldError::new(ValidationErrorKind::DuplicateItems))
        }
    }

    fn description(&self) -> String {
        "unique items".to_string()
    }
}

impl<T: Eq + Hash> ValidationRule<Option<Vec<T>>> for UniqueItems {
    fn validate(&self, value: &Option<Vec<T>>) -> Option<FieldError> {
        value
            .as_ref()
            .and_then(|v| <UniqueItems as ValidationRule<Vec<T>>>::validate(self, v))
    }

    fn description(&self) -> String {
        "unique items".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(Required.validate(&"Ada".to_string()).is_none());
        assert!(Required.validate(&String::new()).is_some());
        assert!(Required.validate(&"   ".to_string()).is_some());
    }

    #[test]
    fn test_required_optional_field() {
        assert!(Required.validate(&None::<String>).is_none());
        assert!(Required.validate(&Some(String::new())).is_some());
        assert!(Required.validate(&Some("x".to_string())).is_none());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("superadmin@example.com"));
        assert!(is_valid_email("First.Last+tag@Sub.Example.ORG"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("user@host"));
        assert!(!is_valid_email("user@host.c"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn test_email_rule_skips_empty() {
        assert!(Email.validate(&String::new()).is_none());
        assert!(Email.validate(&"bad".to_string()).is_some());
    }

    #[test]
    fn test_one_of() {
        let rule = OneOf::new(["view", "edit"]);
        assert!(rule.validate(&"view".to_string()).is_none());
        let err = rule.validate(&"fly".to_string()).unwrap();
        assert_eq!(err.message, "must be one of: view, edit");
        assert!(rule.validate(&None::<String>).is_none());
    }

    #[test]
    fn test_unique_items() {
        assert!(UniqueItems.validate(&vec![1, 2, 3]).is_none());
        assert!(UniqueItems.validate(&vec![1, 2, 1]).is_some());
    }
}
