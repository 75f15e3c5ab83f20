//! One-time codes for password reset.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest code that can be issued.
pub const OTP_MIN: u32 = 100_000;
/// Largest code that can be issued.
pub const OTP_MAX: u32 = 999_999;

/// Persisted OTP with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Issue a fresh uniformly random code valid for `ttl` from `now`.
    pub fn issue(now: DateTime<Utc>, ttl: Duration) -> Self {
        let code = rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX);
        Self {
            code: code.to_string(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn matches(&self, entered: &str) -> bool {
        self.code == entered
    }
}

/// What the stored value under `resetOTP_<email>` turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredOtp {
    Current(OtpRecord),
    /// A bare code without expiry, as older versions wrote it. Never accepted.
    Stale,
}

impl StoredOtp {
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str::<OtpRecord>(raw)
            .map(Self::Current)
            .unwrap_or(Self::Stale)
    }
}

/// Code handed back to the requester (there is no delivery channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
