//! Per-user profile details.

use serde::{Deserialize, Serialize};

use pocketledger_core::{EmailAddress, Session, parse_amount};
use pocketledger_storage::{KeyValueStore, Namespace, Storage, StorageError, StorageKey};

/// Profile entered on the details page.
///
/// `budget` is kept as typed; [`UserProfile::budget_amount`] reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub country: String,
    pub currency: String,
    pub budget: String,
}

impl UserProfile {
    /// A profile counts as set up once it has a name and a budget.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.budget.is_empty()
    }

    /// Monthly budget as a number; non-numeric input reads as zero.
    pub fn budget_amount(&self) -> f64 {
        parse_amount(&self.budget)
    }
}

/// Reads and overwrites `userProfile_<email>`. Profiles are never deleted.
#[derive(Debug, Clone)]
pub struct ProfileStore<S> {
    storage: Storage<S>,
}

impl<S> ProfileStore<S>
where
    S: KeyValueStore,
{
    pub fn new(storage: Storage<S>) -> Self {
        Self { storage }
    }

    pub fn load(&self, email: &EmailAddress) -> Result<Option<UserProfile>, StorageError> {
        self.storage
            .get_json(StorageKey::scoped(Namespace::UserProfile, email))
    }

    /// Create or overwrite the session user's profile.
    pub fn save(&self, session: &Session, profile: &UserProfile) -> Result<(), StorageError> {
        let email = session.email();
        self.storage
            .set_json(StorageKey::scoped(Namespace::UserProfile, email), profile)?;
        tracing::info!(email = %email, complete = profile.is_complete(), "profile saved");
        Ok(())
    }

    /// Budget of the session user, zero without a profile.
    pub fn budget(&self, session: &Session) -> Result<f64, StorageError> {
        Ok(self
            .load(session.email())?
            .map(|p| p.budget_amount())
            .unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketledger_storage::InMemoryStore;

    fn session() -> Session {
        Session::new(EmailAddress::parse("alice@example.com").unwrap())
    }

    fn profile(name: &str, budget: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            country: "India".to_string(),
            currency: "INR".to_string(),
            budget: budget.to_string(),
        }
    }

    #[test]
    fn completeness_needs_name_and_budget() {
        assert!(profile("Alice", "1000").is_complete());
        assert!(profile("Alice", "0").is_complete());
        assert!(!profile("", "1000").is_complete());
        assert!(!profile("Alice", "").is_complete());
    }

    #[test]
    fn budget_reads_leniently() {
        assert_eq!(profile("A", "1500").budget_amount(), 1500.0);
        assert_eq!(profile("A", "lots").budget_amount(), 0.0);
    }

    #[test]
    fn save_overwrites_and_load_reads_back() {
        let store = ProfileStore::new(Storage::new(InMemoryStore::new()));
        let session = session();
        assert_eq!(store.load(session.email()).unwrap(), None);
        assert_eq!(store.budget(&session).unwrap(), 0.0);

        store.save(&session, &profile("Alice", "1000")).unwrap();
        store.save(&session, &profile("Alice B", "2500")).unwrap();

        let loaded = store.load(session.email()).unwrap().unwrap();
        assert_eq!(loaded.name, "Alice B");
        assert_eq!(store.budget(&session).unwrap(), 2500.0);
    }

    #[test]
    fn partial_records_fill_defaults() {
        let storage = Storage::new(InMemoryStore::new());
        storage
            .store()
            .set("userProfile_alice@example.com", r#"{"name":"Alice"}"#.to_string())
            .unwrap();
        let store = ProfileStore::new(storage);
        let loaded = store.load(session().email()).unwrap().unwrap();
        assert_eq!(loaded.name, "Alice");
        assert!(!loaded.is_complete());
    }
}
