//! Explicit session value.

use crate::email::EmailAddress;

/// The authenticated user an operation runs on behalf of.
///
/// Built once from the persisted session marker (or by a successful login)
/// and passed into every ledger and report call, so no operation reads the
/// marker behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    email: EmailAddress,
}

impl Session {
    pub fn new(email: EmailAddress) -> Self {
        Self { email }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}
