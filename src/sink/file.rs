//! Rotating file sink.

use super::Sink;
use crate::config::{FileConfig, OutputMode, DEFAULT_MAX_FILES};
use crate::error::{BuildError, BuildResult};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Permission mask for created log directories.
const DIR_MODE: u32 = 0o750;

/// File sink with optional size-based rotation.
pub struct FileSink {
    inner: Mutex<RotatingWriter>,
}

impl FileSink {
    /// Create a file sink from a validated configuration.
    ///
    /// Synchronously ensures the parent directory exists, creating it with
    /// restrictive permissions if absent. Does not open the log file yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// existing file cannot be inspected.
    pub fn new(config: &FileConfig) -> BuildResult<Self> {
        Ok(Self {
            inner: Mutex::new(RotatingWriter::new(config)?),
        })
    }

    /// Current tracked size of the active log file.
    pub fn current_size(&self) -> u64 {
        self.inner.lock().map(|w| w.current_size).unwrap_or(0)
    }
}

impl Sink for FileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "file sink lock poisoned"))?;
        writer.write_line(line)
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "file sink lock poisoned"))?;
        writer.flush()
    }

    fn mode(&self) -> OutputMode {
        OutputMode::File
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.lock() {
            Ok(w) => f
                .debug_struct("FileSink")
                .field("path", &w.path)
                .field("max_size", &w.max_size)
                .field("current_size", &w.current_size)
                .finish(),
            Err(_) => f.debug_struct("FileSink").finish_non_exhaustive(),
        }
    }
}

/// Append writer that rotates once a size threshold is crossed.
struct RotatingWriter {
    path: PathBuf,
    max_size: Option<u64>,
    max_files: u32,
    file_mode: u32,
    current_size: u64,
    writer: Option<BufWriter<File>>,
}

impl RotatingWriter {
    fn new(config: &FileConfig) -> BuildResult<Self> {
        let path = config.path.clone();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_restricted(parent).map_err(|e| BuildError::Directory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let current_size = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(BuildError::Open {
                    path,
                    source: e,
                });
            }
        };

        Ok(Self {
            path,
            max_size: config.max_size,
            max_files: config.max_files.unwrap_or(DEFAULT_MAX_FILES),
            file_mode: config.mode,
            current_size,
            writer: None,
        })
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.rotate_if_needed()?;

        let writer = self.writer()?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;

        self.current_size += line.len() as u64 + 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        if self.writer.is_none() {
            let mut options = OpenOptions::new();
            options.create(true).append(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(self.file_mode);
            }
            let file = options.open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(self.writer.as_mut().expect("writer was just created"))
    }

    fn needs_rotation(&self) -> bool {
        match self.max_size {
            Some(max) => self.current_size >= max,
            None => false,
        }
    }

    fn rotate_if_needed(&mut self) -> io::Result<()> {
        if !self.needs_rotation() {
            return Ok(());
        }
        self.rotate()
    }

    fn rotate(&mut self) -> io::Result<()> {
        // Close the active writer before renaming.
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }

        if self.path.exists() {
            let rotated = self.rotated_path();
            fs::rename(&self.path, &rotated)?;
            self.cleanup_old_rotations()?;
        }

        self.current_size = 0;
        Ok(())
    }

    fn rotated_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let parent = self.path.parent().unwrap_or(Path::new("."));
        let timestamp = Utc::now().format("%Y%m%d-%H%M%S");

        let mut candidate = parent.join(format!("{stem}.{timestamp}.{ext}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = parent.join(format!("{stem}.{timestamp}-{n}.{ext}"));
            n += 1;
        }
        candidate
    }

    fn cleanup_old_rotations(&self) -> io::Result<()> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let active = self.path.file_name().unwrap_or_default().to_os_string();

        let mut rotations: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&format!("{stem}.")) && *n != *active.to_string_lossy())
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first.
        rotations.sort_by_key(|p| {
            fs::metadata(p)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        while rotations.len() > self.max_files as usize {
            let oldest = rotations.remove(0);
            let _ = fs::remove_file(oldest);
        }

        Ok(())
    }
}

fn create_dir_restricted(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(path)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(path)
    }
}
