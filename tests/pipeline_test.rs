//! Integration tests for the logging output pipeline.

use logway::{
    clear_correlation_id, resolve_and_build, set_correlation_id, Environment, LogContext,
    LogLevel, LoggerHandle, MemorySink, OutputMode, Settings,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;

fn memory_handle(settings: Settings) -> (LoggerHandle, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let handle = LoggerHandle::with_sink(settings, sink.clone());
    (handle, sink)
}

fn parse_line(line: &str) -> Value {
    serde_json::from_str(line).unwrap()
}

#[test]
fn test_build_never_fails_for_any_mode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    for mode in [
        OutputMode::Stdout,
        OutputMode::Stderr,
        OutputMode::File,
        OutputMode::Collector,
        OutputMode::Disabled,
    ] {
        let settings = Settings::new()
            .with_output(mode)
            .with_file_path(path.to_string_lossy().to_string())
            .with_collector_host("127.0.0.1");

        let handle = resolve_and_build(settings);
        // Whatever the destination, emitting must not panic.
        handle.root().info("probe");
        let _ = handle.flush();
    }
}

#[test]
fn test_bad_file_path_falls_back_to_stdout() {
    let settings = Settings::new()
        .with_output(OutputMode::File)
        .with_file_path("../../etc/passwd");

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
    handle.root().warn("still works");
}

#[test]
fn test_overlong_multibyte_file_path_falls_back_cleanly() {
    let settings = Settings::new()
        .with_output(OutputMode::File)
        .with_file_path(format!("/var/log/{}", "ü".repeat(4200)));

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
    handle.root().info("still works");
}

#[test]
fn test_overlong_multibyte_collector_host_falls_back_cleanly() {
    let settings = Settings::new()
        .with_output(OutputMode::Collector)
        .with_collector_host("日".repeat(300));

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
}

#[test]
fn test_bad_collector_host_falls_back_to_stdout() {
    let settings = Settings::new()
        .with_output(OutputMode::Collector)
        .with_collector_host("bad..host");

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
}

#[test]
fn test_stdio_clean_selects_stderr() {
    let handle = resolve_and_build(Settings::new().with_stdio_clean(true));
    assert_eq!(handle.current_mode(), OutputMode::Stderr);
}

#[test]
fn test_switch_round_trip_preserves_behavior() {
    let handle = resolve_and_build(Settings::new());
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
    let root = handle.root();

    handle.switch_output(OutputMode::Stderr);
    assert_eq!(handle.current_mode(), OutputMode::Stderr);
    // Loggers handed out before the switch follow it.
    root.info("on stderr now");

    handle.switch_output(OutputMode::Stdout);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
    root.info("back on stdout");
}

#[test]
fn test_repeated_switch_to_same_mode_is_idempotent() {
    let handle = resolve_and_build(Settings::new());
    handle.switch_output(OutputMode::Stderr);
    handle.switch_output(OutputMode::Stderr);
    assert_eq!(handle.current_mode(), OutputMode::Stderr);
}

#[test]
fn test_switch_to_unusable_mode_keeps_current_destination() {
    // No file path configured, so the file destination cannot validate.
    let handle = resolve_and_build(Settings::new());
    handle.switch_output(OutputMode::File);
    assert_eq!(handle.current_mode(), OutputMode::Stdout);
    handle.root().info("unaffected");
}

#[test]
fn test_child_loggers_nest_and_share_destination() {
    let (handle, sink) = memory_handle(Settings::new().with_level(LogLevel::Trace));

    let service = handle.child_logger("service", LogContext::new().with("service", "api"));
    let request = service.child("request", LogContext::new().with("request_id", "r-9"));
    let step = request.child("step", LogContext::new().with("step", 3));

    step.debug("deep");
    assert_eq!(sink.count(), 1);

    let record = parse_line(&sink.lines()[0]);
    assert_eq!(record["module"], "service.request.step");
    assert_eq!(record["service"], "api");
    assert_eq!(record["request_id"], "r-9");
    assert_eq!(record["step"], 3);
}

#[test]
fn test_child_context_overrides_parent_entry() {
    let (handle, sink) = memory_handle(Settings::new());

    let parent = handle.child_logger("a", LogContext::new().with("zone", "east"));
    let child = parent.child("b", LogContext::new().with("zone", "west"));
    child.info("zoned");

    let record = parse_line(&sink.lines()[0]);
    assert_eq!(record["zone"], "west");
}

#[test]
fn test_per_call_fields_override_context() {
    let (handle, sink) = memory_handle(Settings::new());

    let log = handle.child_logger("x", LogContext::new().with("attempt", 1));
    log.log(LogLevel::Info, &[("attempt", json!(2))], "retried");

    let record = parse_line(&sink.lines()[0]);
    assert_eq!(record["attempt"], 2);
}

#[test]
fn test_production_defaults_filter_debug() {
    let (handle, sink) = memory_handle(Settings::new().with_environment(Environment::Production));

    let root = handle.root();
    root.debug("suppressed");
    root.trace("suppressed");
    root.info("kept");
    root.error("kept");

    assert_eq!(sink.count(), 2);
}

#[test]
fn test_disabled_mode_suppresses_all_levels() {
    let handle = resolve_and_build(
        Settings::new()
            .with_output(OutputMode::Disabled)
            .with_level(LogLevel::Trace),
    );

    assert_eq!(handle.current_mode(), OutputMode::Disabled);
    let root = handle.root();
    assert!(!root.enabled(LogLevel::Error));
    root.error("dropped");
}

#[test]
fn test_redaction_removes_secret_fields() {
    let (handle, sink) = memory_handle(Settings::new());

    handle.root().log(
        LogLevel::Info,
        &[
            ("user", json!("ada")),
            ("password", json!("hunter2")),
            ("payload", json!({"api_key": "abc", "size": 7})),
        ],
        "login",
    );

    let line = &sink.lines()[0];
    assert!(!line.contains("hunter2"));
    assert!(!line.contains("abc"));

    let record = parse_line(line);
    assert_eq!(record["user"], "ada");
    assert!(record.get("password").is_none());
    assert_eq!(record["payload"]["size"], 7);
    assert!(record["payload"].get("api_key").is_none());
}

#[test]
fn test_correlation_id_attached_in_production_only() {
    let (prod, prod_sink) =
        memory_handle(Settings::new().with_environment(Environment::Production));
    let (dev, dev_sink) = memory_handle(Settings::new());

    set_correlation_id("req-55");
    prod.root().info("prod record");
    dev.root().info("dev record");
    clear_correlation_id();

    let prod_record = parse_line(&prod_sink.lines()[0]);
    assert_eq!(prod_record["correlationId"], "req-55");

    let dev_record = parse_line(&dev_sink.lines()[0]);
    assert!(dev_record.get("correlationId").is_none());
}

#[test]
fn test_file_destination_writes_and_rotates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rotated.log");

    let mut settings = Settings::new()
        .with_output(OutputMode::File)
        .with_file_path(path.to_string_lossy().to_string())
        .with_level(LogLevel::Trace);
    settings.file.max_size = Some("1K".to_string());
    settings.file.max_files = Some("2".to_string());

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::File);

    let root = handle.root();
    let filler = "x".repeat(120);
    for i in 0..40 {
        root.log(LogLevel::Info, &[("fill", json!(filler)), ("i", json!(i))], "bulk");
    }
    handle.flush().unwrap();

    assert!(path.exists());
    let rotated = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("rotated.") && name != "rotated.log"
        })
        .count();
    assert!(rotated >= 1, "expected at least one rotated file");
    assert!(rotated <= 2, "retention should cap rotated files at 2");
}

#[test]
fn test_file_lines_are_valid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.log");

    let settings = Settings::new()
        .with_output(OutputMode::File)
        .with_file_path(path.to_string_lossy().to_string());

    let handle = resolve_and_build(settings);
    handle.root().info("first");
    handle
        .root()
        .log(LogLevel::Warn, &[("code", json!(7))], "second");
    handle.flush().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    // One bootstrap record plus the two emitted above.
    let records: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["message"], "logger initialized");
    assert_eq!(records[1]["message"], "first");
    assert_eq!(records[2]["code"], 7);
}

#[test]
fn test_collector_destination_never_errors_when_unreachable() {
    let mut settings = Settings::new()
        .with_output(OutputMode::Collector)
        .with_collector_host("127.0.0.1");
    settings.collector.port = Some("1".to_string());
    settings.collector.protocol = Some("tcp".to_string());

    let handle = resolve_and_build(settings);
    assert_eq!(handle.current_mode(), OutputMode::Collector);
    for _ in 0..10 {
        handle.root().error("into the void");
    }
}

#[test]
fn test_handle_clones_share_switch_state() {
    let handle = resolve_and_build(Settings::new());
    let clone = handle.clone();
    assert!(LoggerHandle::same_handle(&handle, &clone));

    clone.switch_output(OutputMode::Stderr);
    assert_eq!(handle.current_mode(), OutputMode::Stderr);
}

#[test]
fn test_concurrent_emission_during_switch() {
    use std::thread;

    let handle = resolve_and_build(Settings::new().with_output(OutputMode::Disabled));
    let mut workers = Vec::new();

    for _ in 0..4 {
        let h = handle.clone();
        workers.push(thread::spawn(move || {
            for i in 0..200 {
                h.root().log(LogLevel::Info, &[("i", json!(i))], "spin");
            }
        }));
    }

    for _ in 0..20 {
        handle.switch_output(OutputMode::Stderr);
        handle.switch_output(OutputMode::Disabled);
    }

    for worker in workers {
        worker.join().unwrap();
    }
}
