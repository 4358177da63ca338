// src/sinks/file.rs

//! Sink for writing log events to a file, with user-space buffering and
//! size-based rotation.

use crate::common::{File, FileOpenOptions, FileSz, LogError, LogResult, NLc};
use crate::data::event::LogEventP;
use crate::de_err;
use crate::format::formatter::Formatter;
use crate::sinks::{FormatterCell, Sink};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default user-space buffer capacity in bytes.
pub const BUFFER_CAPACITY_DEFAULT: usize = 8192;

/// Default count of rotation backup files.
pub const MAX_BACKUP_COUNT_DEFAULT: usize = 5;

/// Mutable file-sink state, all under one mutex.
struct FileSinkState {
    /// `None` between a rotation close and the reopen
    stream: Option<File>,
    /// formatted records waiting for a buffer flush
    buffer: String,
    /// bytes destined for the current file: bytes flushed to the stream
    /// since open or last rotation, plus bytes pending in `buffer`
    file_size: FileSz,
}

/// Sink writing newline-terminated UTF-8 records to a file.
///
/// Writes go through a user-space buffer of `buffer_capacity` bytes
/// (`0` writes directly to the stream). When `max_file_size` is nonzero
/// and `file_size` reaches it after a write, the file rotates: pending
/// buffer content is flushed, the current file becomes
/// `<stem>_backup1.<ext>`, existing backups shift up, the oldest
/// (`_backup<max_backup_count>`) is deleted, and a fresh file is opened
/// truncated.
pub struct FileSink {
    formatter: FormatterCell,
    path: PathBuf,
    buffer_capacity: usize,
    state: Mutex<FileSinkState>,
    /// rotation trigger; `0` means unbounded (no rotation)
    max_file_size: AtomicU64,
    /// backup files kept by rotation; `0` means delete instead of rotate
    max_backup_count: AtomicUsize,
}

impl FileSink {
    /// Open a `FileSink` at `path`.
    ///
    /// A missing parent directory is created (recursively). The file
    /// opens in append mode unless `truncate` is set; when appending to
    /// an existing file, the size counter resynchronizes from the file's
    /// current length.
    pub fn new(
        path: &str,
        truncate: bool,
        buffer_capacity: usize,
    ) -> LogResult<FileSink> {
        defn!("({:?}, truncate={}, buffer_capacity={})", path, truncate, buffer_capacity);
        let path: PathBuf = PathBuf::from(path);
        let file_size: FileSz = if !truncate {
            match path.metadata() {
                Ok(metadata) => metadata.len(),
                Err(_) => 0,
            }
        } else {
            0
        };
        let stream: File = open_stream(&path, truncate)?;
        defx!("({:?}) file_size={}", path, file_size);

        Ok(FileSink {
            formatter: FormatterCell::default(),
            path,
            buffer_capacity,
            state: Mutex::new(FileSinkState {
                stream: Some(stream),
                buffer: String::with_capacity(buffer_capacity),
                file_size,
            }),
            max_file_size: AtomicU64::new(0),
            max_backup_count: AtomicUsize::new(MAX_BACKUP_COUNT_DEFAULT),
        })
    }

    /// Same sink with `formatter` pre-installed.
    pub fn with_formatter(
        self,
        formatter: Formatter,
    ) -> FileSink {
        self.formatter
            .replace(formatter);

        self
    }

    /// Set the rotation trigger in bytes; `0` disables rotation.
    pub fn set_max_file_size(
        &self,
        max_file_size: FileSz,
    ) {
        self.max_file_size
            .store(max_file_size, Ordering::Relaxed);
    }

    /// Set the count of backup files rotation keeps; `0` makes rotation
    /// delete the current file instead.
    pub fn set_max_backup_count(
        &self,
        max_backup_count: usize,
    ) {
        self.max_backup_count
            .store(max_backup_count, Ordering::Relaxed);
    }

    /// The sink's file path.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Bytes destined for the current file: flushed plus buffered.
    pub fn file_size(&self) -> FileSz {
        self.state
            .lock()
            .unwrap()
            .file_size
    }

    /// Flush the buffer, close, and reopen the file.
    ///
    /// When not truncating and the file exists, the size counter
    /// resynchronizes from the file system.
    pub fn reopen(
        &self,
        truncate: bool,
    ) -> LogResult<()> {
        defn!("({:?}, truncate={})", self.path, truncate);
        let mut state = self
            .state
            .lock()
            .unwrap();
        self.flush_buffer(&mut state)?;
        state.stream = None;
        state.stream = Some(open_stream(&self.path, truncate)?);
        state.file_size = if !truncate {
            match self.path.metadata() {
                Ok(metadata) => metadata.len(),
                Err(_) => 0,
            }
        } else {
            0
        };
        defx!("({:?}) file_size={}", self.path, state.file_size);

        Ok(())
    }

    /// The sibling path `<stem>_backup<index>.<ext>`.
    fn backup_path(
        &self,
        index: usize,
    ) -> PathBuf {
        let stem: &str = self
            .path
            .file_stem()
            .and_then(|name| name.to_str())
            .unwrap_or("log");
        let mut name: String = format!("{}_backup{}", stem, index);
        if let Some(ext) = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
        {
            name.push('.');
            name.push_str(ext);
        }

        match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Write `text` straight to the stream. Caller holds the state mutex
    /// and accounts `file_size` itself.
    fn write_to_stream(
        &self,
        state: &mut FileSinkState,
        text: &str,
    ) -> LogResult<()> {
        if state.stream.is_none() {
            // a prior rotation failed between close and reopen
            state.stream = Some(open_stream(&self.path, false)?);
        }
        if let Some(stream) = state.stream.as_mut() {
            if let Err(err) = stream.write_all(text.as_bytes()) {
                return Err(LogError::io(&self.path, err));
            }
        }

        Ok(())
    }

    /// Drain the user-space buffer to the stream; `file_size` already
    /// accounts these bytes. Caller holds the state mutex.
    fn flush_buffer(
        &self,
        state: &mut FileSinkState,
    ) -> LogResult<()> {
        if state.buffer.is_empty() {
            return Ok(());
        }
        let buffered: String = std::mem::take(&mut state.buffer);
        state
            .buffer
            .reserve(self.buffer_capacity);

        self.write_to_stream(state, buffered.as_str())
    }

    /// Rotate when the trigger fired. Caller holds the state mutex.
    fn rotate_if_needed(
        &self,
        state: &mut FileSinkState,
    ) -> LogResult<()> {
        let max_file_size: FileSz = self
            .max_file_size
            .load(Ordering::Relaxed);
        if max_file_size > 0 && state.file_size >= max_file_size {
            return self.rotate(state);
        }

        Ok(())
    }

    /// Rotate: flush pending buffer content and close the stream, shift
    /// `_backupN` files up, rename the current file to `_backup1`, and
    /// reopen truncated. With `max_backup_count == 0` the current file is
    /// deleted instead. Caller holds the state mutex.
    fn rotate(
        &self,
        state: &mut FileSinkState,
    ) -> LogResult<()> {
        defn!("({:?})", self.path);
        self.flush_buffer(state)?;
        if let Some(stream) = state.stream.as_mut() {
            if let Err(err) = stream.flush() {
                return Err(LogError::io(&self.path, err));
            }
        }
        state.stream = None;

        let max_backup_count: usize = self
            .max_backup_count
            .load(Ordering::Relaxed);
        if max_backup_count > 0 {
            let oldest: PathBuf = self.backup_path(max_backup_count);
            if oldest.exists() {
                if let Err(err) = std::fs::remove_file(&oldest) {
                    return Err(LogError::io(&oldest, err));
                }
            }
            for index in (2..=max_backup_count).rev() {
                let src: PathBuf = self.backup_path(index - 1);
                if src.exists() {
                    let dst: PathBuf = self.backup_path(index);
                    if let Err(err) = std::fs::rename(&src, &dst) {
                        return Err(LogError::io(&src, err));
                    }
                }
            }
            if self.path.exists() {
                let dst: PathBuf = self.backup_path(1);
                if let Err(err) = std::fs::rename(&self.path, &dst) {
                    return Err(LogError::io(&self.path, err));
                }
            }
        } else if self.path.exists() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                return Err(LogError::io(&self.path, err));
            }
        }

        state.file_size = 0;
        state.stream = Some(open_stream(&self.path, true)?);
        defx!("({:?}) rotated", self.path);

        Ok(())
    }
}

impl Sink for FileSink {
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()> {
        let mut line: String = self
            .formatter
            .render(event);
        if !line.ends_with(NLc) {
            line.push(NLc);
        }

        let mut state = self
            .state
            .lock()
            .unwrap();
        if self.buffer_capacity == 0 {
            self.write_to_stream(&mut state, line.as_str())?;
            state.file_size += line.len() as FileSz;

            return self.rotate_if_needed(&mut state);
        }
        if state.buffer.len() + line.len() > self.buffer_capacity {
            self.flush_buffer(&mut state)?;
        }
        state
            .buffer
            .push_str(line.as_str());
        state.file_size += line.len() as FileSz;

        self.rotate_if_needed(&mut state)
    }

    fn flush(&self) -> LogResult<()> {
        let mut state = self
            .state
            .lock()
            .unwrap();
        self.flush_buffer(&mut state)?;
        if let Some(stream) = state.stream.as_mut() {
            if let Err(err) = stream.flush() {
                return Err(LogError::io(&self.path, err));
            }
        }

        Ok(())
    }

    fn set_formatter(
        &self,
        formatter: Formatter,
    ) {
        self.formatter
            .replace(formatter);
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            de_err!("FileSink::drop flush failed: {}", err);
        }
    }
}

/// Open the sink file at `path`, creating a missing parent directory
/// (recursively). Binary append mode unless `truncate`.
fn open_stream(
    path: &Path,
    truncate: bool,
) -> LogResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            defo!("create_dir_all({:?})", parent);
            if let Err(err) = std::fs::create_dir_all(parent) {
                return Err(LogError::io(parent, err));
            }
        }
    }

    let mut open_options = FileOpenOptions::new();
    open_options
        .write(true)
        .create(true);
    if truncate {
        open_options.truncate(true);
    } else {
        open_options.append(true);
    }

    match open_options.open(path) {
        Ok(val) => Ok(val),
        Err(err) => Err(LogError::io(path, err)),
    }
}
