//! Mode resolution, logger assembly, and the runtime switch controller.
//!
//! [`resolve_and_build`] is the one entry point that turns [`Settings`]
//! into a working [`LoggerHandle`]. It never fails: a rejected or
//! unbuildable destination is reported through the [`FallbackLogger`] and
//! replaced with plain stdout logging. The handle stays valid across
//! [`LoggerHandle::switch_output`] calls, so loggers held by callers keep
//! working through a destination change.

use crate::builder::build_destination;
use crate::config::{OutputMode, Settings};
use crate::fallback::FallbackLogger;
use crate::logger::{Logger, LoggerCore, LogContext};
use crate::redaction::RedactionRuleSet;
use crate::sink::{Sink, StreamSink};
use crate::validate::{validate_destination, ValidationOutcome};
use std::sync::{Arc, RwLock};

/// Resolve the output mode the settings ask for.
///
/// An explicit output selection wins. Without one, the stdio-clean flag
/// routes logs to stderr so stdout stays free for program output; the
/// final default is stdout.
pub fn resolve_mode(settings: &Settings) -> OutputMode {
    if let Some(mode) = settings.output {
        return mode;
    }
    if settings.stdio_clean {
        return OutputMode::Stderr;
    }
    OutputMode::Stdout
}

/// Build a logger handle from settings. This never fails.
///
/// The requested destination is validated and built; if either step
/// rejects it, the failure is reported on the fallback channel and the
/// handle starts on stdout instead.
pub fn resolve_and_build(settings: Settings) -> LoggerHandle {
    let fallback = FallbackLogger::new();
    let requested = resolve_mode(&settings);
    let core = build_core(&settings, requested, &fallback).unwrap_or_else(|| {
        fallback.report_fallback(requested);
        stdout_core(&settings)
    });

    let handle = LoggerHandle {
        inner: Arc::new(HandleInner {
            core: RwLock::new(core),
            settings,
            fallback,
        }),
    };

    let root = handle.root();
    root.log(
        handle.with_core(|c| c.min_level()),
        &[("output", serde_json::json!(handle.current_mode().to_string()))],
        "logger initialized",
    );
    handle
}

/// Validate and build a core for one mode. `None` means the destination
/// was unusable; the failure itself has been reported, but the caller
/// reports what it substitutes, since startup falls back to stdout while
/// a refused switch keeps the current destination.
fn build_core(settings: &Settings, mode: OutputMode, fallback: &FallbackLogger) -> Option<LoggerCore> {
    let destination = match validate_destination(settings, mode) {
        ValidationOutcome::Valid {
            destination,
            advisories,
        } => {
            for advisory in &advisories {
                fallback.advise(advisory);
            }
            destination
        }
        ValidationOutcome::Rejected(rejection) => {
            fallback.report_rejection(&rejection);
            return None;
        }
    };

    let sink = match build_destination(destination) {
        Ok(sink) => sink,
        Err(err) => {
            fallback.report_build_failure(&err);
            return None;
        }
    };

    Some(LoggerCore::new(
        sink,
        mode,
        settings.effective_level(),
        RedactionRuleSet::standard(),
        settings.environment,
    ))
}

/// The guaranteed-available core used when the requested destination
/// cannot be served.
fn stdout_core(settings: &Settings) -> LoggerCore {
    LoggerCore::new(
        Arc::new(StreamSink::stdout()),
        OutputMode::Stdout,
        settings.effective_level(),
        RedactionRuleSet::standard(),
        settings.environment,
    )
}

struct HandleInner {
    core: RwLock<LoggerCore>,
    settings: Settings,
    fallback: FallbackLogger,
}

/// Shared, clonable handle to the active logging destination.
///
/// All [`Logger`] views delegate through one handle, so switching the
/// output replaces the destination for every logger at once while the
/// handle itself keeps its identity.
#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<HandleInner>,
}

impl LoggerHandle {
    /// Build a handle around an explicit sink.
    ///
    /// Intended for embedders and tests that need to capture emitted
    /// lines; [`resolve_and_build`] is the normal entry point.
    pub fn with_sink(settings: Settings, sink: Arc<dyn Sink>) -> LoggerHandle {
        let mode = sink.mode();
        let core = LoggerCore::new(
            sink,
            mode,
            settings.effective_level(),
            RedactionRuleSet::standard(),
            settings.environment,
        );
        LoggerHandle {
            inner: Arc::new(HandleInner {
                core: RwLock::new(core),
                settings,
                fallback: FallbackLogger::new(),
            }),
        }
    }

    /// The root logger for this handle.
    pub fn root(&self) -> Logger {
        Logger::root(self.clone())
    }

    /// A named child of the root logger.
    pub fn child_logger(&self, name: &str, context: LogContext) -> Logger {
        self.root().child(name, context)
    }

    /// The mode currently being written to.
    pub fn current_mode(&self) -> OutputMode {
        self.with_core(|core| core.mode())
    }

    /// Switch the active destination at runtime.
    ///
    /// A request for the mode already in use is a no-op. The replacement
    /// destination is validated and built before the old one is touched;
    /// if it is unusable the failure is reported and the current
    /// destination stays in service. Either way this never fails and the
    /// handle remains valid.
    pub fn switch_output(&self, mode: OutputMode) {
        if self.current_mode() == mode {
            return;
        }

        let Some(new_core) = build_core(&self.inner.settings, mode, &self.inner.fallback) else {
            self.inner
                .fallback
                .report_switch_kept(mode, self.current_mode());
            return;
        };

        let mut guard = self
            .inner
            .core
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if let Err(err) = guard.flush() {
            self.inner
                .fallback
                .warn(&format!("flush of previous output failed during switch: {err}"));
        }
        *guard = new_core;
    }

    /// Flush buffered records on the active destination.
    pub fn flush(&self) -> std::io::Result<()> {
        self.with_core(|core| core.flush())
    }

    /// Whether two handles refer to the same underlying destination state.
    pub fn same_handle(a: &LoggerHandle, b: &LoggerHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn with_core<R>(&self, f: impl FnOnce(&LoggerCore) -> R) -> R {
        let guard = self.inner.core.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }
}

impl std::fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("mode", &self.current_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, LogLevel};
    use crate::sink::MemorySink;

    fn memory_handle() -> (LoggerHandle, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let settings = Settings::default().with_level(LogLevel::Trace);
        let handle = LoggerHandle::with_sink(settings, sink.clone());
        (handle, sink)
    }

    #[test]
    fn test_resolve_mode_default_is_stdout() {
        assert_eq!(resolve_mode(&Settings::default()), OutputMode::Stdout);
    }

    #[test]
    fn test_resolve_mode_stdio_clean_routes_to_stderr() {
        let settings = Settings::default().with_stdio_clean(true);
        assert_eq!(resolve_mode(&settings), OutputMode::Stderr);
    }

    #[test]
    fn test_resolve_mode_explicit_output_wins_over_stdio_clean() {
        let settings = Settings::default()
            .with_stdio_clean(true)
            .with_output(OutputMode::File);
        assert_eq!(resolve_mode(&settings), OutputMode::File);
    }

    #[test]
    fn test_logger_emits_through_memory_sink() {
        let (handle, sink) = memory_handle();
        handle.root().info("hello");
        assert_eq!(sink.count(), 1);
        assert!(sink.lines()[0].contains("\"message\":\"hello\""));
    }

    #[test]
    fn test_clones_share_destination_state() {
        let (handle, sink) = memory_handle();
        let clone = handle.clone();
        assert!(LoggerHandle::same_handle(&handle, &clone));
        clone.root().info("via clone");
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_switch_to_same_mode_is_noop() {
        let settings = Settings::default();
        let handle = resolve_and_build(settings);
        let before = handle.current_mode();
        handle.switch_output(before);
        assert_eq!(handle.current_mode(), before);
    }

    #[test]
    fn test_switch_to_unusable_destination_keeps_current() {
        // File mode without a path cannot validate.
        let handle = resolve_and_build(Settings::default());
        assert_eq!(handle.current_mode(), OutputMode::Stdout);
        handle.switch_output(OutputMode::File);
        assert_eq!(handle.current_mode(), OutputMode::Stdout);
    }

    #[test]
    fn test_refused_switch_keeps_non_default_destination() {
        // A refused switch retains whatever is active, not stdout.
        let handle = resolve_and_build(Settings::default().with_stdio_clean(true));
        assert_eq!(handle.current_mode(), OutputMode::Stderr);
        handle.switch_output(OutputMode::File);
        assert_eq!(handle.current_mode(), OutputMode::Stderr);
    }

    #[test]
    fn test_switch_to_disabled_suppresses_everything() {
        let handle = resolve_and_build(Settings::default().with_level(LogLevel::Trace));
        handle.switch_output(OutputMode::Disabled);
        assert_eq!(handle.current_mode(), OutputMode::Disabled);
        assert!(!handle.root().enabled(LogLevel::Error));
        // Still must not panic.
        handle.root().error("dropped");
    }

    #[test]
    fn test_rejected_destination_falls_back_to_stdout() {
        let settings = Settings::default()
            .with_output(OutputMode::File)
            .with_file_path("../../etc/passwd");
        let handle = resolve_and_build(settings);
        assert_eq!(handle.current_mode(), OutputMode::Stdout);
    }

    #[test]
    fn test_production_environment_level_defaults_to_info() {
        let sink = Arc::new(MemorySink::new());
        let settings = Settings::default().with_environment(Environment::Production);
        let handle = LoggerHandle::with_sink(settings, sink.clone());
        let root = handle.root();
        root.debug("hidden");
        root.info("kept");
        assert_eq!(sink.count(), 1);
        assert!(sink.lines()[0].contains("kept"));
    }
}
