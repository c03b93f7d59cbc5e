//! Leadtrail Configuration Management
//!
//! Loads tracking configuration from a TOML file layered with `LEADTRAIL_`
//! environment variables, validates it, and builds the configured sink.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, ENV_PREFIX};
pub use types::{ConfigLoader, SinkConfig, SinkHandle, SinkKind, TrackingConfig};
