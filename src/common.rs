// src/common.rs

//! Common imports, type aliases, the error taxonomy, and other globals for
//! _sallib_.

#[doc(hidden)]
pub use std::fs::File;
#[doc(hidden)]
pub use std::path::Path;

extern crate thiserror;
use thiserror::Error;

/// `F`ake `Path` or `F`ile `Path`.
///
/// Type alias `FPath` is a simpler stand-in for formalized file system path
/// [`std::path::Path`].
///
/// `std::path::Path` does not have trait `Sized` so instances must be
/// passed-by-reference which sprinkles explicit lifetimes around. It is much
/// easier to use a [`String`] and convert to a `Path` as needed.
///
/// [`String`]: std::string::String
pub type FPath = String;

#[doc(hidden)]
pub type FileMetadata = std::fs::Metadata;

#[doc(hidden)]
pub type FileOpenOptions = std::fs::OpenOptions;

/// File Size in bytes
pub type FileSz = u64;

/// A general-purpose counting type, typically used for internal statistics
/// counting.
pub type Count = u64;

/// A [`Vec`](std::vec::Vec) of `u8`.
pub type Bytes = Vec<u8>;

/// *N*ew*L*ine as a [`char`].
#[allow(non_upper_case_globals)]
pub const NLc: char = '\n';
/// *N*ew*L*ine as a [`str`].
#[allow(non_upper_case_globals)]
pub const NLs: &str = "\n";
/// Single-byte *N*ew*L*ine `char` as [`u8`].
#[allow(non_upper_case_globals)]
pub const NLu8: u8 = 10;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// error taxonomy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Errors surfaced by the logging pipeline.
///
/// Producer-facing failures at submit time surface as `Err`. Downstream
/// (sink) failures are isolated per event by the logger worker and reported
/// to stderr; they never abort the worker.
#[derive(Debug, Error)]
pub enum LogError {
    /// Garbage arguments at API boundaries; unknown enum strings
    /// (e.g. not `"stdout"` or `"stderr"`); duplicate parent assignment.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The ring buffer rejected a push. Callers on the hot path drop the
    /// event and count the drop; this variant exists for surfaces that
    /// choose to report instead.
    #[error("ring buffer is full")]
    QueueFull,
    /// File sink write/open/rotate failure.
    #[error("I/O failure on {path:?}: {source}")]
    IoFailure {
        path: FPath,
        source: std::io::Error,
    },
    /// Settings JSON parse or schema violation.
    #[error("bad settings: {0}")]
    BadSettings(String),
    /// WebSocket connection or send failure.
    #[error("websocket transport error: {0}")]
    Transport(String),
}

/// [`Result`] with the [`LogError`] taxonomy.
///
/// [`Result`]: std::result::Result
pub type LogResult<T> = Result<T, LogError>;

impl LogError {
    /// Helper to wrap an [`std::io::Error`] with the offending path.
    pub fn io(
        path: &Path,
        source: std::io::Error,
    ) -> LogError {
        LogError::IoFailure {
            path: FPath::from(path.to_string_lossy()),
            source,
        }
    }

    /// Returns `true` if the error is [`QueueFull`].
    ///
    /// [`QueueFull`]: self::LogError#variant.QueueFull
    #[inline(always)]
    pub const fn is_queue_full(&self) -> bool {
        matches!(*self, LogError::QueueFull)
    }

    /// Returns `true` if the error is [`InvalidParameter`].
    ///
    /// [`InvalidParameter`]: self::LogError#variant.InvalidParameter
    #[inline(always)]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(*self, LogError::InvalidParameter(_))
    }
}

#[macro_export]
macro_rules! debug_panic {
    ($($arg:tt)*) => (
        if cfg!(debug_assertions) {
            panic!($($arg)*);
        }
    )
}
pub use debug_panic;
