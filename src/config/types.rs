//! Core configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default permission mask for created log files (owner read/write,
/// group read, no world access).
pub const DEFAULT_FILE_MODE: u32 = 0o640;

/// Default number of rotated files retained when rotation is active.
pub const DEFAULT_MAX_FILES: u32 = 5;

/// Default port for the network log collector.
pub const DEFAULT_COLLECTOR_PORT: u16 = 514;

/// Log output destination mode.
///
/// A closed set: adding a destination is a compile-time-checked change
/// because every `match` over this enum is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Standard output (default).
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// Rotating or plain append file.
    File,
    /// Network log collector (syslog-style, fire-and-forget).
    Collector,
    /// No output at all.
    Disabled,
}

impl OutputMode {
    /// String representation, matching the configuration key values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Collector => "collector",
            Self::Disabled => "disabled",
        }
    }

    /// Parse from a configuration value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "stderr" => Some(Self::Stderr),
            "file" => Some(Self::File),
            "collector" | "network-collector" | "syslog" => Some(Self::Collector),
            "disabled" | "none" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose - trace execution flow.
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

impl LogLevel {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse from string. `fatal` maps onto `Error`, the most severe level.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "fatal" => Some(Self::Error),
            _ => None,
        }
    }

    /// Check if this level should be logged given a minimum level.
    pub fn should_log(&self, min_level: LogLevel) -> bool {
        *self >= min_level
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime environment the process is operating in.
///
/// Controls the default minimum level and whether advisories about
/// loopback hosts and privileged ports apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (verbose default).
    #[default]
    Development,
    /// Production-like deployment.
    Production,
    /// Automated test runs (quiet default).
    Test,
}

impl Environment {
    /// Parse from a configuration value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    /// Default minimum level when no explicit level is configured.
    pub fn default_level(&self) -> LogLevel {
        match self {
            Self::Development => LogLevel::Debug,
            Self::Production => LogLevel::Info,
            Self::Test => LogLevel::Warn,
        }
    }

    /// Whether this environment warrants production-hardening advisories.
    pub fn is_production_like(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Transport protocol for the network collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectorProtocol {
    /// Connectionless datagrams (default, classic syslog).
    #[default]
    Udp,
    /// Stream transport with lazy connect.
    Tcp,
}

impl CollectorProtocol {
    /// Parse from a configuration value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "udp" => Some(Self::Udp),
            "tcp" => Some(Self::Tcp),
            _ => None,
        }
    }
}

/// Destination configuration, keyed by [`OutputMode`].
///
/// Console and disabled variants carry no extra fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DestinationConfig {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// File destination.
    File(FileConfig),
    /// Network collector destination.
    Collector(CollectorConfig),
    /// No-op destination.
    Disabled,
}

impl DestinationConfig {
    /// The output mode this configuration belongs to.
    pub fn mode(&self) -> OutputMode {
        match self {
            Self::Stdout => OutputMode::Stdout,
            Self::Stderr => OutputMode::Stderr,
            Self::File(_) => OutputMode::File,
            Self::Collector(_) => OutputMode::Collector,
            Self::Disabled => OutputMode::Disabled,
        }
    }
}

/// File destination configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Absolute or relative log file path.
    pub path: PathBuf,

    /// Rotation threshold in bytes. `None` means a plain append writer.
    pub max_size: Option<u64>,

    /// Number of rotated files to retain.
    pub max_files: Option<u32>,

    /// Permission mask for created files.
    #[serde(default = "default_file_mode")]
    pub mode: u32,
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

impl FileConfig {
    /// Create a plain append-file configuration for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: None,
            max_files: None,
            mode: DEFAULT_FILE_MODE,
        }
    }

    /// Builder: set the rotation size threshold.
    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Builder: set the number of retained rotated files.
    #[must_use]
    pub fn with_max_files(mut self, count: u32) -> Self {
        self.max_files = Some(count);
        self
    }

    /// Builder: set the permission mask.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// Network collector destination configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Hostname or IP literal of the collector.
    pub host: String,

    /// Collector port.
    pub port: u16,

    /// Transport protocol.
    #[serde(default)]
    pub protocol: CollectorProtocol,
}

impl CollectorConfig {
    /// Create a collector configuration with the default port and protocol.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_COLLECTOR_PORT,
            protocol: CollectorProtocol::Udp,
        }
    }

    /// Builder: set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder: set the transport protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: CollectorProtocol) -> Self {
        self.protocol = protocol;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_parse() {
        assert_eq!(OutputMode::parse("stdout"), Some(OutputMode::Stdout));
        assert_eq!(OutputMode::parse("STDERR"), Some(OutputMode::Stderr));
        assert_eq!(OutputMode::parse("file"), Some(OutputMode::File));
        assert_eq!(OutputMode::parse("collector"), Some(OutputMode::Collector));
        assert_eq!(
            OutputMode::parse("network-collector"),
            Some(OutputMode::Collector)
        );
        assert_eq!(OutputMode::parse("disabled"), Some(OutputMode::Disabled));
        assert_eq!(OutputMode::parse("printer"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_should_log() {
        assert!(LogLevel::Error.should_log(LogLevel::Info));
        assert!(LogLevel::Info.should_log(LogLevel::Info));
        assert!(!LogLevel::Debug.should_log(LogLevel::Info));
    }

    #[test]
    fn test_log_level_parse_fatal() {
        assert_eq!(LogLevel::parse("fatal"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_environment_default_levels() {
        assert_eq!(Environment::Development.default_level(), LogLevel::Debug);
        assert_eq!(Environment::Production.default_level(), LogLevel::Info);
        assert_eq!(Environment::Test.default_level(), LogLevel::Warn);
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("prod"), Some(Environment::Production));
        assert_eq!(Environment::parse("dev"), Some(Environment::Development));
        assert_eq!(Environment::parse("test"), Some(Environment::Test));
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn test_destination_config_mode() {
        assert_eq!(DestinationConfig::Stdout.mode(), OutputMode::Stdout);
        assert_eq!(
            DestinationConfig::File(FileConfig::new("/tmp/a.log")).mode(),
            OutputMode::File
        );
        assert_eq!(
            DestinationConfig::Collector(CollectorConfig::new("logs.example.com")).mode(),
            OutputMode::Collector
        );
        assert_eq!(DestinationConfig::Disabled.mode(), OutputMode::Disabled);
    }

    #[test]
    fn test_file_config_builder() {
        let config = FileConfig::new("/var/log/app.log")
            .with_max_size(10 * 1024 * 1024)
            .with_max_files(3)
            .with_mode(0o600);

        assert_eq!(config.max_size, Some(10 * 1024 * 1024));
        assert_eq!(config.max_files, Some(3));
        assert_eq!(config.mode, 0o600);
    }

    #[test]
    fn test_collector_config_defaults() {
        let config = CollectorConfig::new("10.0.0.1");
        assert_eq!(config.port, DEFAULT_COLLECTOR_PORT);
        assert_eq!(config.protocol, CollectorProtocol::Udp);
    }
}
