//! Logger factory output and the context wrapper.
//!
//! [`LoggerCore`] is what the factory produces: one minimum level, one
//! fixed redaction rule set, and one built sink. [`Logger`] is the view
//! callers hold; it borrows the process-wide [`LoggerHandle`] and carries
//! an immutable [`LogContext`]. Deriving a child extends the context and
//! returns another `Logger`, so the derive capability survives at every
//! nesting depth.

use crate::config::{Environment, LogLevel, OutputMode};
use crate::record::LogRecord;
use crate::redaction::RedactionRuleSet;
use crate::sink::Sink;
use crate::switch::LoggerHandle;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static CORRELATION_ID: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Set the correlation identifier for the current execution context.
///
/// In a production-like environment every record emitted from this thread
/// carries the identifier until it is cleared.
pub fn set_correlation_id(id: impl Into<String>) {
    CORRELATION_ID.with(|c| *c.borrow_mut() = Some(id.into()));
}

/// Clear the correlation identifier for the current execution context.
pub fn clear_correlation_id() {
    CORRELATION_ID.with(|c| *c.borrow_mut() = None);
}

/// The correlation identifier currently attached to this execution context.
pub fn current_correlation_id() -> Option<String> {
    CORRELATION_ID.with(|c| c.borrow().clone())
}

/// An immutable, ordered key/value context attached to a logger.
///
/// A child context is created by extension, never by mutating the parent,
/// which allows unlimited, side-effect-free nesting depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    entries: Vec<(String, Value)>,
}

impl LogContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an entry. A duplicate key replaces the earlier entry
    /// while keeping its position.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl serde::Serialize) -> Self {
        let key = key.into();
        if let Ok(value) = serde_json::to_value(value) {
            match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => self.entries.push((key, value)),
            }
        }
        self
    }

    /// Create a new context from this one plus all entries of `other`.
    #[must_use]
    pub fn extend(&self, other: &LogContext) -> Self {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged = merged.with(key.clone(), value.clone());
        }
        merged
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The capability interface every logger satisfies, regardless of
/// destination: emit a record, check a level, derive a child. Derived
/// children satisfy it too, at any depth.
pub trait Log: Send + Sync {
    /// Emit a record at the given level with per-call fields.
    fn log(&self, level: LogLevel, fields: &[(&str, Value)], message: &str);

    /// Whether a record at this level would be emitted.
    fn enabled(&self, level: LogLevel) -> bool;

    /// Derive a child logger carrying additional context.
    fn derive_child(&self, name: &str, context: LogContext) -> Box<dyn Log>;
}

/// What the logger factory assembles: level, redaction, and a built sink.
pub(crate) struct LoggerCore {
    min_level: LogLevel,
    suppress_all: bool,
    redaction: RedactionRuleSet,
    sink: Arc<dyn Sink>,
    mode: OutputMode,
    environment: Environment,
}

impl LoggerCore {
    /// Combine a built sink with level and redaction configuration.
    ///
    /// For the disabled destination the core suppresses every level, so
    /// callers that check [`LoggerCore::enabled`] first skip field
    /// computation instead of relying on the sink to discard records.
    pub(crate) fn new(
        sink: Arc<dyn Sink>,
        mode: OutputMode,
        min_level: LogLevel,
        redaction: RedactionRuleSet,
        environment: Environment,
    ) -> Self {
        Self {
            min_level,
            suppress_all: mode == OutputMode::Disabled,
            redaction,
            sink,
            mode,
            environment,
        }
    }

    pub(crate) fn enabled(&self, level: LogLevel) -> bool {
        !self.suppress_all && level.should_log(self.min_level)
    }

    pub(crate) fn emit(&self, record: &LogRecord) {
        let line = record.to_json_line(&self.redaction);
        // Emission is fire-and-forget; a failing sink drops the record.
        let _ = self.sink.write_line(&line);
    }

    pub(crate) fn flush(&self) -> std::io::Result<()> {
        self.sink.flush()
    }

    pub(crate) fn mode(&self) -> OutputMode {
        self.mode
    }

    pub(crate) fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub(crate) fn redaction(&self) -> &RedactionRuleSet {
        &self.redaction
    }

    pub(crate) fn environment(&self) -> Environment {
        self.environment
    }
}

impl std::fmt::Debug for LoggerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerCore")
            .field("mode", &self.mode)
            .field("min_level", &self.min_level)
            .field("suppress_all", &self.suppress_all)
            .finish()
    }
}

/// A logger view: the shared handle plus an immutable context.
///
/// Cloning a `Logger` (or deriving a child) never copies the underlying
/// destination; all views delegate through the same [`LoggerHandle`], so
/// a runtime switch is observed by every one of them.
#[derive(Debug, Clone)]
pub struct Logger {
    handle: LoggerHandle,
    module: Option<String>,
    context: LogContext,
}

impl Logger {
    pub(crate) fn root(handle: LoggerHandle) -> Self {
        Self {
            handle,
            module: None,
            context: LogContext::new(),
        }
    }

    /// The handle this logger delegates through.
    pub fn handle(&self) -> &LoggerHandle {
        &self.handle
    }

    /// The module name carried in emitted records.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// The context attached to this logger.
    pub fn context(&self) -> &LogContext {
        &self.context
    }

    /// Whether a record at this level would be emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.handle.with_core(|core| core.enabled(level))
    }

    /// Emit a record with per-call structured fields.
    pub fn log(&self, level: LogLevel, fields: &[(&str, Value)], message: &str) {
        // One read guard for the whole call: a concurrent switch lands
        // entirely before or entirely after this record.
        self.handle.with_core(|core| {
            if !core.enabled(level) {
                return;
            }

            let mut record = LogRecord::new(level, message);
            record.module = self.module.clone();
            for (key, value) in self.context.entries() {
                record.fields.insert(key.clone(), value.clone());
            }
            for (key, value) in fields {
                record.fields.insert((*key).to_string(), value.clone());
            }
            if core.environment().is_production_like() {
                record.correlation_id = current_correlation_id();
            }

            core.emit(&record);
        });
    }

    /// Derive a child logger with a name and additional context.
    ///
    /// The child's module name is dotted onto the parent's; its context is
    /// the parent's extended with `context`. Children can derive further
    /// children at arbitrary depth.
    pub fn child(&self, name: &str, context: LogContext) -> Logger {
        let module = match &self.module {
            Some(parent) => Some(format!("{parent}.{name}")),
            None => Some(name.to_string()),
        };
        Logger {
            handle: self.handle.clone(),
            module,
            context: self.context.extend(&context),
        }
    }

    /// Derive a logger with additional context but the same module name.
    pub fn with_context(&self, context: LogContext) -> Logger {
        Logger {
            handle: self.handle.clone(),
            module: self.module.clone(),
            context: self.context.extend(&context),
        }
    }

    /// Emit at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, &[], message);
    }

    /// Emit at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, &[], message);
    }

    /// Emit at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, &[], message);
    }

    /// Emit at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &[], message);
    }

    /// Emit at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &[], message);
    }
}

impl Log for Logger {
    fn log(&self, level: LogLevel, fields: &[(&str, Value)], message: &str) {
        Logger::log(self, level, fields, message);
    }

    fn enabled(&self, level: LogLevel) -> bool {
        Logger::enabled(self, level)
    }

    fn derive_child(&self, name: &str, context: LogContext) -> Box<dyn Log> {
        Box::new(self.child(name, context))
    }
}

/// Attach distributed-tracing identifiers to a logger.
///
/// Returns a derived logger whose records carry `trace_id` and `span_id`
/// context fields.
pub fn attach_trace_context(
    logger: &Logger,
    trace_id: impl Into<String>,
    span_id: impl Into<String>,
) -> Logger {
    logger.with_context(
        LogContext::new()
            .with("trace_id", trace_id.into())
            .with("span_id", span_id.into()),
    )
}
