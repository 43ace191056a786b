//! Log sinks: the concrete writers a record line lands in.

mod collector;
mod file;

pub use collector::CollectorSink;
pub use file::FileSink;

use crate::config::OutputMode;
use std::io::{self, Write};
use std::sync::Mutex;

/// A destination a formatted record line is written to.
///
/// Sinks are line-oriented: redaction and serialization happen before a
/// line reaches the sink, so every destination receives identical output.
pub trait Sink: Send + Sync {
    /// Write one formatted record line.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> io::Result<()>;

    /// The output mode this sink serves.
    fn mode(&self) -> OutputMode;
}

/// Console stream selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamTarget {
    Stdout,
    Stderr,
}

/// Sink writing to a process console stream.
#[derive(Debug)]
pub struct StreamSink {
    target: StreamTarget,
}

impl StreamSink {
    /// Create a sink for standard output.
    pub fn stdout() -> Self {
        Self {
            target: StreamTarget::Stdout,
        }
    }

    /// Create a sink for standard error.
    pub fn stderr() -> Self {
        Self {
            target: StreamTarget::Stderr,
        }
    }
}

impl Sink for StreamSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{line}")
            }
            StreamTarget::Stderr => {
                let stderr = io::stderr();
                let mut handle = stderr.lock();
                writeln!(handle, "{line}")
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => io::stdout().flush(),
            StreamTarget::Stderr => io::stderr().flush(),
        }
    }

    fn mode(&self) -> OutputMode {
        match self.target {
            StreamTarget::Stdout => OutputMode::Stdout,
            StreamTarget::Stderr => OutputMode::Stderr,
        }
    }
}

/// Sink that discards everything.
///
/// The factory additionally suppresses the logger's level when this sink
/// is active, so callers that check the level first skip field
/// computation entirely.
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    /// Create a no-op sink.
    pub fn new() -> Self {
        Self
    }
}

impl Sink for NullSink {
    fn write_line(&self, _line: &str) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn mode(&self) -> OutputMode {
        OutputMode::Disabled
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of lines written.
    pub fn count(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Clear captured lines.
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned"))?;
        lines.push(line.to_string());
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn mode(&self) -> OutputMode {
        // Behaves like a console sink for test purposes.
        OutputMode::Stdout
    }
}
