//! Process-wide logging setup.

pub mod logging;

pub use logging::{DEFAULT_FILTER, LogConfig, init};
