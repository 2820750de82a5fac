//! Stand-in credential check used by [`AuthStore::login`](super::AuthStore::login).
//!
//! This is not a security boundary. Password hashing, storage, and transport
//! are outside this crate; the verifier only decides whether an
//! `(email, password)` pair is accepted so the authorization model can be
//! exercised end to end.

use serde::Deserialize;
use std::fmt;

/// Email of the seeded super administrator.
pub const SUPERADMIN_EMAIL: &str = "superadmin@example.com";

/// Password the stand-in check accepts for the seeded super administrator.
pub const SUPERADMIN_PASSWORD: &str = "test123";

/// Decides whether a credential pair is accepted.
pub trait CredentialVerifier: fmt::Debug + Send + Sync {
    fn verify(&self, email: &str, password: &str) -> bool;
}

/// A single accepted credential pair.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Fixed list of accepted pairs, compared verbatim.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    accepted: Vec<Credential>,
}

impl StaticCredentials {
    pub fn new(accepted: Vec<Credential>) -> Self {
        Self { accepted }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(vec![Credential::new(SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD)])
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, email: &str, password: &str) -> bool {
        self.accepted
            .iter()
            .any(|c| c.email == email && c.password == password)
    }
}
