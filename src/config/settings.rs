//! Environment-shaped pipeline settings.
//!
//! `Settings` is the untrusted input to the pipeline. Values that the
//! destination validators inspect (path, host, port, permission mask, size
//! strings) are kept as raw strings here; nothing is trusted until
//! [`crate::validate::validate_destination`] has accepted it.

use super::types::{Environment, LogLevel, OutputMode};
use crate::parse::parse_bool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Recognized environment variable keys.
pub mod keys {
    /// Explicit output mode override.
    pub const OUTPUT: &str = "LOGWAY_OUTPUT";
    /// Protocol-compatibility flag: the primary output stream carries a
    /// foreign wire protocol, so logs must go to stderr.
    pub const STDIO_CLEAN: &str = "LOGWAY_STDIO_CLEAN";
    /// Minimum level override.
    pub const LEVEL: &str = "LOGWAY_LEVEL";
    /// Runtime environment name.
    pub const ENV: &str = "LOGWAY_ENV";
    /// File destination path.
    pub const FILE_PATH: &str = "LOGWAY_FILE_PATH";
    /// File rotation threshold (size string, e.g. "10M").
    pub const FILE_MAX_SIZE: &str = "LOGWAY_FILE_MAX_SIZE";
    /// Rotated file retention count.
    pub const FILE_MAX_FILES: &str = "LOGWAY_FILE_MAX_FILES";
    /// Created-file permission mask (octal string).
    pub const FILE_MODE: &str = "LOGWAY_FILE_MODE";
    /// Collector hostname or IP literal.
    pub const COLLECTOR_HOST: &str = "LOGWAY_COLLECTOR_HOST";
    /// Collector port.
    pub const COLLECTOR_PORT: &str = "LOGWAY_COLLECTOR_PORT";
    /// Collector transport protocol (tcp/udp).
    pub const COLLECTOR_PROTOCOL: &str = "LOGWAY_COLLECTOR_PROTOCOL";
}

/// Settings errors (file loading only; env input never fails).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file.
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        /// Path to the settings file.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Raw pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Explicit output mode override, if any.
    pub output: Option<OutputMode>,

    /// Protocol-compatibility flag: keep stdout clean, log to stderr.
    pub stdio_clean: bool,

    /// Minimum level override.
    pub level: Option<LogLevel>,

    /// Runtime environment.
    pub environment: Environment,

    /// File destination settings.
    pub file: FileSettings,

    /// Collector destination settings.
    pub collector: CollectorSettings,
}

/// Raw file destination settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FileSettings {
    /// Log file path.
    pub path: Option<String>,

    /// Rotation threshold as a size string, e.g. "10M".
    pub max_size: Option<String>,

    /// Retained rotated file count.
    pub max_files: Option<String>,

    /// Permission mask as an octal string, e.g. "0640".
    pub mode: Option<String>,
}

/// Raw collector destination settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CollectorSettings {
    /// Collector hostname or IP literal.
    pub host: Option<String>,

    /// Collector port.
    pub port: Option<String>,

    /// Transport protocol (tcp/udp).
    pub protocol: Option<String>,
}

impl Settings {
    /// Create default settings (stdout, environment defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from the process environment.
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }

    /// Build settings from an environment-shaped key/value map.
    ///
    /// Unknown keys are ignored. Values that fail to parse into their
    /// closed sets (mode, level, environment, flag) are treated as absent;
    /// free-form values are carried raw for the validators to judge.
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        Self {
            output: get(keys::OUTPUT).and_then(OutputMode::parse),
            stdio_clean: get(keys::STDIO_CLEAN)
                .and_then(parse_bool)
                .unwrap_or(false),
            level: get(keys::LEVEL).and_then(LogLevel::parse),
            environment: get(keys::ENV)
                .and_then(Environment::parse)
                .unwrap_or_default(),
            file: FileSettings {
                path: get(keys::FILE_PATH).map(String::from),
                max_size: get(keys::FILE_MAX_SIZE).map(String::from),
                max_files: get(keys::FILE_MAX_FILES).map(String::from),
                mode: get(keys::FILE_MODE).map(String::from),
            },
            collector: CollectorSettings {
                host: get(keys::COLLECTOR_HOST).map(String::from),
                port: get(keys::COLLECTOR_PORT).map(String::from),
                protocol: get(keys::COLLECTOR_PROTOCOL).map(String::from),
            },
        }
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is
    /// malformed. A missing or broken settings file is a host-application
    /// decision; the pipeline itself falls back to defaults via
    /// [`Settings::load_or_default`].
    pub fn load<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings from a TOML file, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay environment entries on top of these settings.
    ///
    /// Any key present in the map wins over the corresponding file value.
    #[must_use]
    pub fn overlay_env(mut self, vars: &HashMap<String, String>) -> Self {
        let env = Self::from_map(vars);

        if env.output.is_some() {
            self.output = env.output;
        }
        if vars.contains_key(keys::STDIO_CLEAN) {
            self.stdio_clean = env.stdio_clean;
        }
        if env.level.is_some() {
            self.level = env.level;
        }
        if vars.contains_key(keys::ENV) {
            self.environment = env.environment;
        }
        if env.file.path.is_some() {
            self.file.path = env.file.path;
        }
        if env.file.max_size.is_some() {
            self.file.max_size = env.file.max_size;
        }
        if env.file.max_files.is_some() {
            self.file.max_files = env.file.max_files;
        }
        if env.file.mode.is_some() {
            self.file.mode = env.file.mode;
        }
        if env.collector.host.is_some() {
            self.collector.host = env.collector.host;
        }
        if env.collector.port.is_some() {
            self.collector.port = env.collector.port;
        }
        if env.collector.protocol.is_some() {
            self.collector.protocol = env.collector.protocol;
        }

        self
    }

    /// Builder: set the output mode override.
    #[must_use]
    pub fn with_output(mut self, mode: OutputMode) -> Self {
        self.output = Some(mode);
        self
    }

    /// Builder: set the stdio-clean flag.
    #[must_use]
    pub fn with_stdio_clean(mut self, stdio_clean: bool) -> Self {
        self.stdio_clean = stdio_clean;
        self
    }

    /// Builder: set the minimum level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Builder: set the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Builder: set the file path.
    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file.path = Some(path.into());
        self
    }

    /// Builder: set the collector host.
    #[must_use]
    pub fn with_collector_host(mut self, host: impl Into<String>) -> Self {
        self.collector.host = Some(host.into());
        self
    }

    /// The effective minimum level: explicit override, otherwise the
    /// environment default.
    pub fn effective_level(&self) -> LogLevel {
        self.level.unwrap_or_else(|| self.environment.default_level())
    }
}
