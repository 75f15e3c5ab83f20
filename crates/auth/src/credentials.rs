//! Password rules and salted password hashing.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use pocketledger_core::{DomainError, DomainResult};

/// Symbols of which a strong password must contain at least one.
pub const PASSWORD_SYMBOLS: [char; 7] = ['@', '$', '!', '%', '*', '?', '&'];

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// PBKDF2 rounds for newly hashed passwords.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 20_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;

/// Check the password strength rule: at least eight characters on a single
/// line, with an ASCII lowercase letter, an ASCII uppercase letter, an ASCII
/// digit and one of [`PASSWORD_SYMBOLS`].
pub fn check_password_strength(password: &str) -> DomainResult<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let single_line = !password
        .chars()
        .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(&c));

    if long_enough && single_line && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(DomainError::validation(
            "password must be at least 8 characters and include uppercase, lowercase, number, and special character",
        ))
    }
}

/// Salted one-way password hash.
///
/// Encoded as `pbkdf2-sha256$<iterations>$<salt-hex>$<digest-hex>`, the
/// digest being PBKDF2-HMAC-SHA256 of the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    iterations: u32,
    salt: Vec<u8>,
    digest: [u8; DIGEST_BYTES],
}

impl PasswordHash {
    /// Hash a password under a fresh random salt.
    pub fn generate(password: &str) -> Self {
        Self::generate_with(password, DEFAULT_PBKDF2_ITERATIONS)
    }

    pub fn generate_with(password: &str, iterations: u32) -> Self {
        let mut salt = vec![0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(salt, password, iterations)
    }

    pub fn with_salt(salt: Vec<u8>, password: &str, iterations: u32) -> Self {
        let iterations = iterations.max(1);
        let digest = derive_key(password, &salt, iterations);
        Self {
            iterations,
            salt,
            digest,
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive_key(password, &self.salt, self.iterations);
        candidate[..].ct_eq(&self.digest[..]).into()
    }

    pub fn encode(&self) -> String {
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(&self.salt),
            hex::encode(self.digest)
        )
    }

    /// Parse the encoded form; `None` if the value is not in that form.
    pub fn decode(encoded: &str) -> Option<Self> {
        let mut parts = encoded.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(digest), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };
        if scheme != SCHEME {
            return None;
        }
        let iterations: u32 = iterations.parse().ok().filter(|n| *n > 0)?;
        let salt = hex::decode(salt).ok()?;
        let digest: [u8; DIGEST_BYTES] = hex::decode(digest).ok()?.try_into().ok()?;
        Some(Self {
            iterations,
            salt,
            digest,
        })
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_BYTES] {
    let mut key = [0u8; DIGEST_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// A credential as found in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCredential {
    Hashed(PasswordHash),
    /// Plaintext written by older versions; upgraded on the next login.
    Legacy(String),
}

impl StoredCredential {
    pub fn parse(raw: &str) -> Self {
        match PasswordHash::decode(raw) {
            Some(hash) => Self::Hashed(hash),
            None => Self::Legacy(raw.to_string()),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Hashed(hash) => hash.verify(password),
            Self::Legacy(plain) => plain.as_bytes().ct_eq(password.as_bytes()).into(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}
