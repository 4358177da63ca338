// src/data/level.rs

//! Log severity ordering, string conversions, and an atomic wrapper for
//! threshold storage.

use crate::common::{LogError, LogResult};

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogLevel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Log severity with a total order by position.
///
/// Parsing with [`from_str`] is case-insensitive; rendering is uppercase.
///
/// [`from_str`]: LogLevel#impl-FromStr-for-LogLevel
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Notice = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Uppercase rendering, e.g. `"NOTICE"`.
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lowercase rendering, e.g. `"notice"`; the key form used by
    /// `level_colors` maps in the settings document.
    #[inline(always)]
    pub const fn as_lower_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// All levels in ascending severity order.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Inverse of `LogLevel as u8`, for [`AtomicLogLevel`] storage.
    const fn from_u8(value: u8) -> LogLevel {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Notice,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(value: &str) -> LogResult<LogLevel> {
        for level in LogLevel::ALL.iter() {
            if value.eq_ignore_ascii_case(level.as_str()) {
                return Ok(*level);
            }
        }

        Err(LogError::InvalidParameter(format!("unknown log level {:?}", value)))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AtomicLogLevel
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`LogLevel`] behind an [`AtomicU8`].
///
/// Used for logger thresholds and the WebSocket sink threshold; producer
/// threads read it on every submit, so it must not take a lock.
///
/// [`AtomicU8`]: std::sync::atomic::AtomicU8
#[derive(Debug)]
pub struct AtomicLogLevel(AtomicU8);

impl AtomicLogLevel {
    pub const fn new(level: LogLevel) -> AtomicLogLevel {
        AtomicLogLevel(AtomicU8::new(level as u8))
    }

    #[inline(always)]
    pub fn load(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline(always)]
    pub fn store(
        &self,
        level: LogLevel,
    ) {
        self.0.store(level as u8, Ordering::Release);
    }
}
