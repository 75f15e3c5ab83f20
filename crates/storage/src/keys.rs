//! Key layout of the persisted store.

use pocketledger_core::EmailAddress;

/// Fixed key holding the registry (email → credential).
pub const REGISTRY_KEY: &str = "users";

/// Fixed key holding the logged-in email.
pub const SESSION_KEY: &str = "loggedInUser";

/// Per-user namespaces; the stored key is `<prefix>_<email>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Expenses,
    UserProfile,
    ResetOtp,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Expenses => "expenses",
            Namespace::UserProfile => "userProfile",
            Namespace::ResetOtp => "resetOTP",
        }
    }
}

/// A location in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey<'a> {
    Registry,
    Session,
    Scoped(Namespace, &'a EmailAddress),
}

impl<'a> StorageKey<'a> {
    pub fn scoped(namespace: Namespace, email: &'a EmailAddress) -> Self {
        Self::Scoped(namespace, email)
    }

    pub fn render(&self) -> String {
        match self {
            StorageKey::Registry => REGISTRY_KEY.to_string(),
            StorageKey::Session => SESSION_KEY.to_string(),
            StorageKey::Scoped(ns, email) => format!("{}_{}", ns.prefix(), email),
        }
    }
}

impl core::fmt::Display for StorageKey<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_persisted_layout() {
        let email = EmailAddress::parse("alice@example.com").unwrap();
        assert_eq!(StorageKey::Registry.render(), "users");
        assert_eq!(StorageKey::Session.render(), "loggedInUser");
        assert_eq!(
            StorageKey::scoped(Namespace::Expenses, &email).render(),
            "expenses_alice@example.com"
        );
        assert_eq!(
            StorageKey::scoped(Namespace::UserProfile, &email).render(),
            "userProfile_alice@example.com"
        );
        assert_eq!(
            StorageKey::scoped(Namespace::ResetOtp, &email).render(),
            "resetOTP_alice@example.com"
        );
    }
}
