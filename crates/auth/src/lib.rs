//! `pocketledger-auth`: accounts, sessions and password reset.
//!
//! Credentials are stored as salted hashes in the registry; the session
//! marker is restored into an explicit [`Session`](pocketledger_core::Session).

pub mod credentials;
pub mod gate;
pub mod otp;
pub mod profile;
pub mod service;

pub use credentials::{PasswordHash, StoredCredential, check_password_strength};
pub use gate::{Access, Page};
pub use otp::{IssuedOtp, OtpRecord};
pub use profile::{ProfileStore, UserProfile};
pub use service::{AuthError, AuthPolicy, AuthService, Destination, LoginOutcome};
