//! Structured log records.

use crate::config::LogLevel;
use crate::redaction::RedactionRuleSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// A single structured log record, serialized as one JSON line.
///
/// Shape: `{level, time, message, module, ...context, correlationId?}`.
/// Context entries are flattened into the top level of the record.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Severity level.
    pub level: LogLevel,

    /// Wall-clock timestamp.
    pub time: DateTime<Utc>,

    /// Log message.
    pub message: String,

    /// Originating module name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Structured context and per-call fields, flattened.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Correlation identifier threaded through related records.
    #[serde(rename = "correlationId", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl LogRecord {
    /// Create a new record with the current timestamp.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            message: message.into(),
            module: None,
            fields: Map::new(),
            correlation_id: None,
        }
    }

    /// Builder: set the module name.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Builder: add a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Builder: set the correlation identifier.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Render the record as a single JSON line, applying redaction first.
    ///
    /// Serialization of a record built from JSON-representable values does
    /// not fail; a pathological field is dropped rather than surfaced.
    pub fn to_json_line(&self, redaction: &RedactionRuleSet) -> String {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| {
            Value::String(format!("{} {}", self.level, self.message))
        });
        redaction.apply(&mut value);
        value.to_string()
    }
}
