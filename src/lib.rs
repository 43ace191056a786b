//! # logway
//!
//! A configurable structured-logging output pipeline.
//!
//! logway resolves an output destination from environment-shaped
//! settings, validates it, builds it, and hands back a [`LoggerHandle`]
//! that is guaranteed to work: an unusable destination is reported on a
//! minimal stderr fallback channel and replaced with stdout logging.
//! The handle supports switching destinations at runtime without
//! invalidating the loggers already handed out.
//!
//! ## Quick start
//!
//! ```no_run
//! use logway::{resolve_and_build, LogContext, Settings};
//!
//! let handle = resolve_and_build(Settings::from_env());
//! let log = handle.child_logger("http", LogContext::new().with("service", "api"));
//! log.info("listening");
//! ```
//!
//! ## Destinations
//!
//! - `stdout` / `stderr`: line-buffered process streams
//! - `file`: size-rotated log file with retention and permission control
//! - `collector`: fire-and-forget UDP or TCP network collector
//! - `disabled`: suppress everything
//!
//! Every record passes through a fixed redaction rule set before it is
//! written, so secret-bearing fields never reach any destination.

pub mod builder;
pub mod config;
pub mod error;
pub mod fallback;
pub mod logger;
pub mod parse;
pub mod record;
pub mod redaction;
pub mod sink;
pub mod switch;
pub mod validate;

pub use builder::build_destination;
pub use config::{
    CollectorConfig, CollectorProtocol, CollectorSettings, DestinationConfig, Environment,
    FileConfig, FileSettings, LogLevel, OutputMode, Settings, SettingsError,
};
pub use error::{BuildError, BuildResult};
pub use fallback::FallbackLogger;
pub use logger::{
    attach_trace_context, clear_correlation_id, current_correlation_id, set_correlation_id,
    Log, LogContext, Logger,
};
pub use record::LogRecord;
pub use redaction::RedactionRuleSet;
pub use sink::{MemorySink, Sink};
pub use switch::{resolve_and_build, resolve_mode, LoggerHandle};
pub use validate::{
    validate_destination, Advisory, Rejection, ValidatedDestination, ValidationOutcome,
};
