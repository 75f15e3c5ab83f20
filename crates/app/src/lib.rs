//! `pocketledger-app`: configuration and the tracker facade.

pub mod config;
pub mod tracker;

pub use config::{AppConfig, ConfigError};
pub use tracker::{SharedStore, Tracker, TrackerError, today};
