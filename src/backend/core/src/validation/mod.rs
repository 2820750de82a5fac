//! Form validation for store inputs.
//!
//! The store accepts any input it is given. Callers that take input from
//! people (the CLI, an admin UI) validate first:
//!
//! | Input                  | Rules                                                 |
//! |------------------------|-------------------------------------------------------|
//! | `NewUser`              | name, email, role_id required; email well-formed      |
//! | `NewRole`, `NewTeam`   | name, description required                            |
//! | `NewPermission`        | all fields required; resource and action from the fixed vocabularies |
//!
//! Patches apply the same rules to the fields they carry.
//!
//! ```rust
//! use warden_core::rbac::NewUser;
//! use warden_core::validation::Validate;
//!
//! let input = NewUser::new("not-an-email", "", "user");
//! let errors = input.validate().unwrap_err();
//! assert!(errors.has_errors("email"));
//! assert!(errors.has_errors("name"));
//! ```

pub mod error;
pub mod rules;
pub mod validator;

pub use error::{FieldError, ValidationErrorKind, ValidationErrors, ValidationResult};
pub use rules::{is_valid_email, Email, OneOf, Required, UniqueItems, ValidationRule};
pub use validator::{validate_field, validate_request, FieldValidator, RequestValidator, Validate};

use crate::rbac::models::{
    Action, NewPermission, NewRole, NewTeam, NewUser, PermissionPatch, Resource, RolePatch,
    TeamPatch, UserPatch,
};

fn resources() -> OneOf {
    OneOf::new(Resource::all().map(|r| r.as_str()))
}

fn actions() -> OneOf {
    OneOf::new(Action::all().map(|a| a.as_str()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Create inputs
// ═══════════════════════════════════════════════════════════════════════════════

impl Validate for NewUser {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("email", &self.email).rule(Required).rule(Email))
            .field(validate_field("role_id", &self.role_id.0).rule(Required))
            .field(validate_field("team_ids", &self.team_ids).rule(UniqueItems))
            .result()
    }
}

impl Validate for NewRole {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(validate_field("permission_ids", &self.permission_ids).rule(UniqueItems))
            .result()
    }
}

impl Validate for NewPermission {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(
                validate_field("resource", &self.resource)
                    .rule(Required)
                    .rule(resources()),
            )
            .field(
                validate_field("action", &self.action)
                    .rule(Required)
                    .rule(actions()),
            )
            .result()
    }
}

impl Validate for NewTeam {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(validate_field("user_ids", &self.user_ids).rule(UniqueItems))
            .result()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Patches
// ═══════════════════════════════════════════════════════════════════════════════

impl Validate for UserPatch {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("email", &self.email).rule(Required).rule(Email))
            .field(validate_field("role_id", &self.role_id).rule(Required))
            .field(validate_field("team_ids", &self.team_ids).rule(UniqueItems))
            .result()
    }
}

impl Validate for RolePatch {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(validate_field("permission_ids", &self.permission_ids).rule(UniqueItems))
            .result()
    }
}

impl Validate for PermissionPatch {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(
                validate_field("resource", &self.resource)
                    .rule(Required)
                    .rule(resources()),
            )
            .field(
                validate_field("action", &self.action)
                    .rule(Required)
                    .rule(actions()),
            )
            .result()
    }
}

impl Validate for TeamPatch {
    fn validate(&self) -> ValidationResult<()> {
        validate_request()
            .field(validate_field("name", &self.name).rule(Required))
            .field(validate_field("description", &self.description).rule(Required))
            .field(validate_field("user_ids", &self.user_ids).rule(UniqueItems))
            .result()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
