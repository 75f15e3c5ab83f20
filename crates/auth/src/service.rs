//! Registration, login, session marker and password reset.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use pocketledger_core::{DomainError, EmailAddress, Session};
use pocketledger_storage::{KeyValueStore, Namespace, Storage, StorageError, StorageKey};

use crate::credentials::{PasswordHash, StoredCredential, check_password_strength};
use crate::gate::{self, Access, Page};
use crate::otp::{IssuedOtp, OtpRecord, StoredOtp};
use crate::profile::ProfileStore;

/// Email → encoded credential, persisted under the registry key.
type Registry = BTreeMap<String, String>;

/// Default lifetime of a password-reset code.
pub const DEFAULT_OTP_TTL_SECS: i64 = 600;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// The user-facing failure, if this is one.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            AuthError::Domain(e) => Some(e),
            AuthError::Storage(_) => None,
        }
    }
}

/// Tunables of the auth manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    pub otp_ttl: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            otp_ttl: Duration::seconds(DEFAULT_OTP_TTL_SECS),
        }
    }
}

/// Where a freshly logged-in user should land.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Destination {
    Dashboard,
    ProfileSetup,
}

impl Destination {
    pub fn page(self) -> Page {
        match self {
            Destination::Dashboard => Page::Protected("dashboard.html".to_string()),
            Destination::ProfileSetup => Page::Details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub destination: Destination,
}

/// Session/auth manager over the key-value store.
#[derive(Debug, Clone)]
pub struct AuthService<S> {
    storage: Storage<S>,
    profiles: ProfileStore<S>,
    policy: AuthPolicy,
}

impl<S> AuthService<S>
where
    S: KeyValueStore + Clone,
{
    pub fn new(storage: Storage<S>, policy: AuthPolicy) -> Self {
        let profiles = ProfileStore::new(storage.clone());
        Self {
            storage,
            profiles,
            policy,
        }
    }

    pub fn policy(&self) -> AuthPolicy {
        self.policy
    }

    /// Register a new account. Does not log the user in.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<EmailAddress, AuthError> {
        let (email, password, confirm_password) =
            (email.trim(), password.trim(), confirm_password.trim());

        if email.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(DomainError::validation("please fill all fields").into());
        }
        let email = EmailAddress::parse(email)?;
        check_password_strength(password)?;
        if password != confirm_password {
            return Err(DomainError::validation("passwords do not match").into());
        }

        let mut registry = self.registry()?;
        if registry.contains_key(email.as_str()) {
            return Err(DomainError::conflict("user already registered, please login").into());
        }

        registry.insert(
            email.as_str().to_string(),
            PasswordHash::generate(password).encode(),
        );
        self.save_registry(&registry)?;

        tracing::info!(email = %email, "user registered");
        Ok(email)
    }

    /// Check credentials, persist the session marker and pick the landing page.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = EmailAddress::parse(email.trim())?;
        let password = password.trim();

        let mut registry = self.registry()?;
        let Some(stored) = registry.get(email.as_str()) else {
            tracing::warn!(email = %email, "login for unregistered email");
            return Err(
                DomainError::not_found("user not registered, please register first").into(),
            );
        };

        let credential = StoredCredential::parse(stored);
        if !credential.verify(password) {
            tracing::warn!(email = %email, "login with incorrect password");
            return Err(DomainError::unauthorized("incorrect password").into());
        }

        if credential.is_legacy() {
            registry.insert(
                email.as_str().to_string(),
                PasswordHash::generate(password).encode(),
            );
            self.save_registry(&registry)?;
            tracing::info!(email = %email, "upgraded plaintext credential");
        }

        self.storage.set_raw(StorageKey::Session, email.as_str())?;

        let destination = match self.profiles.load(&email)? {
            Some(profile) if profile.is_complete() => Destination::Dashboard,
            _ => Destination::ProfileSetup,
        };

        tracing::info!(email = %email, ?destination, "user logged in");
        Ok(LoginOutcome {
            session: Session::new(email),
            destination,
        })
    }

    /// Clear the session marker.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.storage.remove(StorageKey::Session)?;
        tracing::info!("user logged out");
        Ok(())
    }

    /// Restore the session from the persisted marker.
    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(marker) = self.storage.get_raw(StorageKey::Session)? else {
            return Ok(None);
        };
        match EmailAddress::parse(&marker) {
            Ok(email) => Ok(Some(Session::new(email))),
            Err(_) => {
                tracing::warn!("ignoring malformed session marker");
                Ok(None)
            }
        }
    }

    pub fn has_accounts(&self) -> Result<bool, AuthError> {
        Ok(!self.registry()?.is_empty())
    }

    pub fn is_registered(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.registry()?.contains_key(email.trim()))
    }

    /// Decide whether `page` may load for the current store state.
    pub fn gate(&self, page: &Page) -> Result<Access, AuthError> {
        if page.is_public() {
            return Ok(Access::Allow);
        }
        let logged_in = self.current_session()?.is_some();
        Ok(gate::decide(page, self.has_accounts()?, logged_in))
    }

    /// Issue a reset code for a registered email and hand it back.
    pub fn request_otp(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedOtp, AuthError> {
        let email = EmailAddress::parse(email.trim())?;
        if !self.registry()?.contains_key(email.as_str()) {
            return Err(DomainError::not_found("email not registered").into());
        }

        let record = OtpRecord::issue(now, self.policy.otp_ttl);
        self.storage
            .set_json(StorageKey::scoped(Namespace::ResetOtp, &email), &record)?;

        tracing::info!(email = %email, expires_at = %record.expires_at, "reset code issued");
        Ok(IssuedOtp {
            code: record.code,
            expires_at: record.expires_at,
        })
    }

    /// Overwrite a registered user's password without a code.
    pub fn reset_password(&self, email: &str, new_password: &str) -> Result<(), AuthError> {
        let (email, new_password) = (email.trim(), new_password.trim());
        if email.is_empty() || new_password.is_empty() {
            return Err(DomainError::validation("please fill all fields").into());
        }

        let mut registry = self.registry()?;
        let Some(credential) = registry.get_mut(email) else {
            return Err(DomainError::not_found("email not registered").into());
        };
        *credential = PasswordHash::generate(new_password).encode();
        self.save_registry(&registry)?;

        tracing::info!(email = %email, "password reset");
        Ok(())
    }

    /// Check a reset code and, if it is current and matches, replace the
    /// password and consume the code.
    pub fn verify_otp_and_reset(
        &self,
        email: &str,
        entered_otp: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let (email, entered_otp, new_password) =
            (email.trim(), entered_otp.trim(), new_password.trim());
        if email.is_empty() || entered_otp.is_empty() || new_password.is_empty() {
            return Err(DomainError::validation("please fill all fields").into());
        }
        check_password_strength(new_password)?;
        let email = EmailAddress::parse(email)?;

        let otp_key = StorageKey::scoped(Namespace::ResetOtp, &email);
        let Some(raw) = self.storage.get_raw(otp_key)? else {
            tracing::warn!(email = %email, "reset attempted without a code");
            return Err(DomainError::conflict("no reset code requested").into());
        };

        let record = match StoredOtp::parse(&raw) {
            StoredOtp::Current(record) if !record.is_expired(now) => record,
            _ => {
                self.storage.remove(otp_key)?;
                tracing::warn!(email = %email, "stale reset code");
                return Err(DomainError::unauthorized("reset code expired").into());
            }
        };
        if !record.matches(entered_otp) {
            tracing::warn!(email = %email, "reset code mismatch");
            return Err(DomainError::unauthorized("invalid reset code").into());
        }

        let mut registry = self.registry()?;
        registry.insert(
            email.as_str().to_string(),
            PasswordHash::generate(new_password).encode(),
        );
        self.save_registry(&registry)?;
        self.storage.remove(otp_key)?;

        tracing::info!(email = %email, "password reset with code");
        Ok(())
    }

    fn registry(&self) -> Result<Registry, StorageError> {
        Ok(self.storage.get_json(StorageKey::Registry)?.unwrap_or_default())
    }

    fn save_registry(&self, registry: &Registry) -> Result<(), StorageError> {
        self.storage.set_json(StorageKey::Registry, registry)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::profile::UserProfile;
    use pocketledger_storage::InMemoryStore;

    const EMAIL: &str = "alice@example.com";
    const PASSWORD: &str = "Secret#1!";

    fn service() -> (AuthService<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let svc = AuthService::new(Storage::new(store.clone()), AuthPolicy::default());
        (svc, store)
    }

    fn registered() -> (AuthService<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
        let (svc, store) = service();
        svc.register(EMAIL, PASSWORD, PASSWORD).unwrap();
        (svc, store)
    }

    fn domain(err: AuthError) -> DomainError {
        err.domain().cloned().expect("expected a domain error")
    }

    #[test]
    fn register_stores_a_hash_and_no_session() {
        let (svc, store) = service();
        let email = svc.register(" alice@example.com ", PASSWORD, PASSWORD).unwrap();
        assert_eq!(email.as_str(), EMAIL);

        let raw = store.get("users").unwrap().unwrap();
        let registry: Registry = serde_json::from_str(&raw).unwrap();
        let stored = registry.get(EMAIL).unwrap();
        assert_ne!(stored, PASSWORD);
        assert!(stored.starts_with("pbkdf2-sha256$"));

        assert!(svc.is_registered(EMAIL).unwrap());
        assert_eq!(svc.current_session().unwrap(), None);
    }

    #[test]
    fn register_validates_in_order() {
        let (svc, _) = service();
        let cases = [
            ("", PASSWORD, PASSWORD, "fill all fields"),
            (EMAIL, "  ", PASSWORD, "fill all fields"),
            ("alice@example", PASSWORD, PASSWORD, "valid email"),
            (EMAIL, "weakpass", "weakpass", "at least 8 characters"),
            (EMAIL, PASSWORD, "Secret#2!", "do not match"),
        ];
        for (email, pw, confirm, needle) in cases {
            match domain(svc.register(email, pw, confirm).unwrap_err()) {
                DomainError::Validation(msg) => assert!(msg.contains(needle), "{msg}"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(!svc.has_accounts().unwrap());
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let (svc, _) = registered();
        let err = domain(svc.register(EMAIL, "Other@22a", "Other@22a").unwrap_err());
        assert!(matches!(err, DomainError::Conflict(_)));
        // Original credential untouched.
        svc.login(EMAIL, PASSWORD).unwrap();
    }

    #[test]
    fn email_keys_are_case_sensitive() {
        let (svc, _) = registered();
        svc.register("Alice@example.com", PASSWORD, PASSWORD).unwrap();
        let err = domain(svc.login("ALICE@example.com", PASSWORD).unwrap_err());
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn login_failures_map_to_the_taxonomy() {
        let (svc, store) = registered();
        assert!(matches!(
            domain(svc.login("not-an-email", PASSWORD).unwrap_err()),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            domain(svc.login("bob@example.com", PASSWORD).unwrap_err()),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            domain(svc.login(EMAIL, "Secret#1").unwrap_err()),
            DomainError::Unauthorized(_)
        ));
        assert_eq!(store.get("loggedInUser").unwrap(), None);
    }

    #[test]
    fn login_sets_marker_and_routes_by_profile() {
        let (svc, store) = registered();

        let first = svc.login(EMAIL, PASSWORD).unwrap();
        assert_eq!(first.destination, Destination::ProfileSetup);
        assert_eq!(first.session.email().as_str(), EMAIL);
        assert_eq!(store.get("loggedInUser").unwrap().as_deref(), Some(EMAIL));
        assert_eq!(svc.current_session().unwrap(), Some(first.session.clone()));

        let profiles = ProfileStore::new(Storage::new(store.clone()));
        profiles
            .save(
                &first.session,
                &UserProfile {
                    name: "Alice".to_string(),
                    budget: String::new(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            svc.login(EMAIL, PASSWORD).unwrap().destination,
            Destination::ProfileSetup
        );

        profiles
            .save(
                &first.session,
                &UserProfile {
                    name: "Alice".to_string(),
                    budget: "1000".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let again = svc.login(EMAIL, PASSWORD).unwrap();
        assert_eq!(again.destination, Destination::Dashboard);
        assert_eq!(again.destination.page().file_name(), "dashboard.html");
    }

    #[test]
    fn plaintext_credentials_are_upgraded_on_login() {
        let (svc, store) = service();
        store
            .set("users", format!(r#"{{"{EMAIL}":"{PASSWORD}"}}"#))
            .unwrap();

        svc.login(EMAIL, PASSWORD).unwrap();

        let registry: Registry = serde_json::from_str(&store.get("users").unwrap().unwrap()).unwrap();
        assert!(registry[EMAIL].starts_with("pbkdf2-sha256$"));
        svc.login(EMAIL, PASSWORD).unwrap();
    }

    #[test]
    fn logout_clears_the_marker() {
        let (svc, store) = registered();
        svc.login(EMAIL, PASSWORD).unwrap();
        svc.logout().unwrap();
        svc.logout().unwrap();
        assert_eq!(store.get("loggedInUser").unwrap(), None);
        assert_eq!(svc.current_session().unwrap(), None);
    }

    #[test]
    fn malformed_marker_is_no_session() {
        let (svc, store) = registered();
        store.set("loggedInUser", "null".to_string()).unwrap();
        assert_eq!(svc.current_session().unwrap(), None);
    }

    #[test]
    fn gate_follows_registry_and_marker() {
        let (svc, _) = service();
        let dash = Page::from_path("dashboard.html");
        assert_eq!(svc.gate(&Page::Login).unwrap(), Access::Allow);
        assert_eq!(svc.gate(&dash).unwrap(), Access::Redirect(Page::Login));

        svc.register(EMAIL, PASSWORD, PASSWORD).unwrap();
        assert_eq!(svc.gate(&dash).unwrap(), Access::Redirect(Page::Login));

        svc.login(EMAIL, PASSWORD).unwrap();
        assert_eq!(svc.gate(&dash).unwrap(), Access::Allow);
    }

    #[test]
    fn gate_rejects_blank_or_malformed_markers() {
        let (svc, store) = registered();
        let dash = Page::from_path("dashboard.html");
        for marker in ["", "null", "not an email"] {
            store.set("loggedInUser", marker.to_string()).unwrap();
            assert_eq!(
                svc.gate(&dash).unwrap(),
                Access::Redirect(Page::Login),
                "{marker:?}"
            );
        }
    }

    #[test]
    fn request_otp_requires_a_registered_valid_email() {
        let (svc, _) = registered();
        let now = Utc::now();
        assert!(matches!(
            domain(svc.request_otp("nope", now).unwrap_err()),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            domain(svc.request_otp("bob@example.com", now).unwrap_err()),
            DomainError::NotFound(_)
        ));

        let issued = svc.request_otp(EMAIL, now).unwrap();
        assert_eq!(issued.code.len(), 6);
        assert_eq!(issued.expires_at, now + svc.policy().otp_ttl);
    }

    #[test]
    fn otp_reset_is_single_use() {
        let (svc, store) = registered();
        let now = Utc::now();
        let issued = svc.request_otp(EMAIL, now).unwrap();

        svc.verify_otp_and_reset(EMAIL, &issued.code, "Newpass@9", now)
            .unwrap();
        assert_eq!(store.get("resetOTP_alice@example.com").unwrap(), None);
        svc.login(EMAIL, "Newpass@9").unwrap();

        let err = domain(
            svc.verify_otp_and_reset(EMAIL, &issued.code, "Another@9", now)
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn otp_mismatch_keeps_the_code() {
        let (svc, store) = registered();
        let now = Utc::now();
        let issued = svc.request_otp(EMAIL, now).unwrap();
        let wrong = if issued.code == "100000" { "100001" } else { "100000" };

        let err = domain(svc.verify_otp_and_reset(EMAIL, wrong, "Newpass@9", now).unwrap_err());
        assert!(matches!(err, DomainError::Unauthorized(_)));
        assert!(store.get("resetOTP_alice@example.com").unwrap().is_some());
        svc.login(EMAIL, PASSWORD).unwrap();
    }

    #[test]
    fn expired_or_legacy_codes_are_rejected() {
        let (svc, store) = registered();
        let now = Utc::now();
        let issued = svc.request_otp(EMAIL, now).unwrap();
        let later = now + svc.policy().otp_ttl + Duration::seconds(1);

        let err = domain(
            svc.verify_otp_and_reset(EMAIL, &issued.code, "Newpass@9", later)
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Unauthorized(ref m) if m.contains("expired")));
        assert_eq!(store.get("resetOTP_alice@example.com").unwrap(), None);

        store
            .set("resetOTP_alice@example.com", "123456".to_string())
            .unwrap();
        let err = domain(
            svc.verify_otp_and_reset(EMAIL, "123456", "Newpass@9", now)
                .unwrap_err(),
        );
        assert!(matches!(err, DomainError::Unauthorized(_)));
        svc.login(EMAIL, PASSWORD).unwrap();
    }

    #[test]
    fn otp_reset_validates_inputs_first() {
        let (svc, _) = registered();
        let now = Utc::now();
        assert!(matches!(
            domain(svc.verify_otp_and_reset(EMAIL, "", "Newpass@9", now).unwrap_err()),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            domain(svc.verify_otp_and_reset(EMAIL, "123456", "weak", now).unwrap_err()),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            domain(svc.verify_otp_and_reset(EMAIL, "123456", "Newpass@9", now).unwrap_err()),
            DomainError::Conflict(_)
        ));
    }

    #[test]
    fn direct_reset_overwrites_registered_passwords_only() {
        let (svc, _) = registered();
        assert!(matches!(
            domain(svc.reset_password(EMAIL, " ").unwrap_err()),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            domain(svc.reset_password("bob@example.com", "whatever").unwrap_err()),
            DomainError::NotFound(_)
        ));

        svc.reset_password(EMAIL, "whatever").unwrap();
        svc.login(EMAIL, "whatever").unwrap();
        assert!(svc.login(EMAIL, PASSWORD).is_err());
    }
}
