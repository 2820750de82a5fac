//! Current-session state: who is signed in, if anyone.
//!
//! A session holds a reference to the user (its id), not a copy. The store
//! resolves it against the live user collection, so a deleted user no longer
//! counts as signed in even while the flag is still set.

use super::models::UserId;

/// Process-wide, single-session state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<UserId>,
    is_authenticated: bool,
}

impl Session {
    /// The signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for the given user.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            current_user: Some(user_id),
            is_authenticated: true,
        }
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }
}
