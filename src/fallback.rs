//! Fallback logger.
//!
//! A fixed, minimal stderr reporter with no dependency on anything that
//! required validation. Used only to report validation rejections,
//! resource-construction failures, and the decision to fall back to the
//! default destination. Never fails: write errors are ignored.

use crate::config::OutputMode;
use crate::error::BuildError;
use crate::validate::{Advisory, Rejection};
use std::io::Write;

/// The always-available console reporter for pipeline problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackLogger;

impl FallbackLogger {
    /// Create the fallback logger. Requires no configuration.
    pub fn new() -> Self {
        Self
    }

    /// Report a validation rejection (offending value already masked).
    pub fn report_rejection(&self, rejection: &Rejection) {
        self.emit("error", &rejection.to_string());
    }

    /// Report a destination construction failure.
    pub fn report_build_failure(&self, error: &BuildError) {
        self.emit("error", &error.to_string());
    }

    /// Report that a requested destination was replaced by the default.
    pub fn report_fallback(&self, requested: OutputMode) {
        self.emit(
            "warn",
            &format!("falling back to stdout logging; requested output '{requested}' is unusable"),
        );
    }

    /// Report that a runtime switch was refused and the current
    /// destination stays in service.
    pub fn report_switch_kept(&self, requested: OutputMode, current: OutputMode) {
        self.emit(
            "warn",
            &format!(
                "keeping current output '{current}'; requested output '{requested}' is unusable"
            ),
        );
    }

    /// Report a non-fatal validation advisory.
    pub fn advise(&self, advisory: &Advisory) {
        self.emit("warn", &advisory.to_string());
    }

    /// Report a best-effort cleanup or switch warning.
    pub fn warn(&self, message: &str) {
        self.emit("warn", message);
    }

    fn emit(&self, level: &str, message: &str) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "logway[{level}]: {message}");
    }
}
