//! Metric names and descriptions.
//!
//! Warden only emits through the `metrics` facade. Nothing is exported unless
//! the embedding application installs a recorder.

use metrics::describe_counter;

/// Login attempts, labelled `outcome` = accepted | rejected | unknown_user.
pub const LOGIN_ATTEMPTS_TOTAL: &str = "warden_login_attempts_total";

/// Permission checks, labelled `outcome` = allow | deny.
pub const PERMISSION_CHECKS_TOTAL: &str = "warden_permission_checks_total";

/// Applied store mutations, labelled `entity` and `op`.
pub const STORE_MUTATIONS_TOTAL: &str = "warden_store_mutations_total";

/// Errors constructed, labelled `code` and `category`.
pub const ERRORS_TOTAL: &str = "warden_errors_total";

/// Register descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(LOGIN_ATTEMPTS_TOTAL, "Login attempts by outcome");
    describe_counter!(PERMISSION_CHECKS_TOTAL, "Permission checks by outcome");
    describe_counter!(
        STORE_MUTATIONS_TOTAL,
        "Store mutations that changed state, by entity and operation"
    );
    describe_counter!(ERRORS_TOTAL, "Errors by code and category");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [
            LOGIN_ATTEMPTS_TOTAL,
            PERMISSION_CHECKS_TOTAL,
            STORE_MUTATIONS_TOTAL,
            ERRORS_TOTAL,
        ] {
            assert!(name.starts_with("warden_"));
            assert!(name.ends_with("_total"));
        }
    }

    #[test]
    fn test_describe_without_recorder_is_noop() {
        describe_metrics();
    }
}
