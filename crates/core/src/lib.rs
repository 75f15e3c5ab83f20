//! `pocketledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage concerns).

pub mod amount;
pub mod email;
pub mod error;
pub mod id;
pub mod session;
pub mod value_object;
pub mod version;

pub use amount::{format_amount, is_numeric, parse_amount};
pub use email::EmailAddress;
pub use error::{DomainError, DomainResult};
pub use id::ExpenseId;
pub use session::Session;
pub use value_object::ValueObject;
pub use version::ExpectedVersion;
