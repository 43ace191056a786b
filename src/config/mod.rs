//! # Configuration System
//!
//! Untrusted, environment-shaped configuration for the logging pipeline:
//! the closed set of output modes, the per-destination configuration
//! union, and the raw [`Settings`] assembled from the process environment
//! or a TOML settings file.
//!
//! Raw settings carry free-form values as strings; the `validate` module
//! is the only way to turn them into a destination the builders accept.

mod settings;
mod types;

pub use settings::{
    keys, CollectorSettings, FileSettings, Settings, SettingsError, SettingsResult,
};
pub use types::{
    CollectorConfig, CollectorProtocol, DestinationConfig, Environment, FileConfig, LogLevel,
    OutputMode, DEFAULT_COLLECTOR_PORT, DEFAULT_FILE_MODE, DEFAULT_MAX_FILES,
};
