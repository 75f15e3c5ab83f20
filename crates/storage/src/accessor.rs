//! Typed access to the key-value store.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::keys::StorageKey;
use crate::store::KeyValueStore;

/// Storage accessor: raw strings for plain values, JSON for records.
#[derive(Debug, Clone)]
pub struct Storage<S> {
    store: S,
}

impl<S> Storage<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn get_raw(&self, key: StorageKey<'_>) -> Result<Option<String>, StorageError> {
        let key = key.render();
        tracing::debug!(%key, "storage read");
        self.store.get(&key)
    }

    pub fn set_raw(&self, key: StorageKey<'_>, value: impl Into<String>) -> Result<(), StorageError> {
        let key = key.render();
        tracing::debug!(%key, "storage write");
        self.store.set(&key, value.into())
    }

    pub fn remove(&self, key: StorageKey<'_>) -> Result<(), StorageError> {
        let key = key.render();
        tracing::debug!(%key, "storage remove");
        self.store.remove(&key)
    }

    /// Read and decode a JSON value. A missing key is `Ok(None)`; a value that
    /// does not decode is an error.
    pub fn get_json<T>(&self, key: StorageKey<'_>) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::serialization(key.render(), e))
    }

    pub fn set_json<T>(&self, key: StorageKey<'_>, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let encoded =
            serde_json::to_string(value).map_err(|e| StorageError::serialization(key.render(), e))?;
        self.set_raw(key, encoded)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pocketledger_core::EmailAddress;

    use super::*;
    use crate::keys::Namespace;
    use crate::memory::InMemoryStore;

    #[test]
    fn json_round_trip_under_namespaced_key() {
        let storage = Storage::new(InMemoryStore::new());
        let email = EmailAddress::parse("alice@example.com").unwrap();
        let key = StorageKey::scoped(Namespace::UserProfile, &email);

        let mut profile = BTreeMap::new();
        profile.insert("name".to_string(), "Alice".to_string());
        storage.set_json(key, &profile).unwrap();

        let raw = storage.store().get("userProfile_alice@example.com").unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"name":"Alice"}"#));

        let back: Option<BTreeMap<String, String>> = storage.get_json(key).unwrap();
        assert_eq!(back, Some(profile));
    }

    #[test]
    fn missing_json_is_none() {
        let storage = Storage::new(InMemoryStore::new());
        let value: Option<Vec<String>> = storage.get_json(StorageKey::Registry).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let storage = Storage::new(InMemoryStore::new());
        storage.set_raw(StorageKey::Registry, "{oops").unwrap();
        let err = storage
            .get_json::<BTreeMap<String, String>>(StorageKey::Registry)
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "users"));
    }
}
