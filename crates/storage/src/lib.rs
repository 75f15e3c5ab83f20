//! Persistent key-value storage for the tracker.
//!
//! Values are strings (JSON for structured records); keys follow the
//! `<namespace>_<email>` convention for per-user data.

pub mod accessor;
pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

pub use accessor::Storage;
pub use error::StorageError;
pub use file::JsonFileStore;
pub use keys::{Namespace, StorageKey};
pub use memory::InMemoryStore;
pub use store::KeyValueStore;
