// src/data/event.rs

//! The immutable log record [`LogEvent`] and the call-site / thread-id
//! capture that feeds it.

use crate::data::datetime::{timestamp_now, DateTimeL};
use crate::data::level::LogLevel;

use std::fmt;
use std::sync::Arc;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// thread id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// OS-level thread identifier.
pub type Tid = u64;

std::thread_local! {
    /// Cached OS thread id; first access calls the OS, subsequent accesses
    /// are a thread-local load.
    static THREAD_ID: Tid = os_thread_id();
}

/// The calling thread's OS-level id, cached in thread-local storage.
#[inline(always)]
pub fn thread_id() -> Tid {
    THREAD_ID.with(|tid| *tid)
}

#[cfg(target_os = "linux")]
fn os_thread_id() -> Tid {
    // always succeeds per gettid(2)
    (unsafe { libc::syscall(libc::SYS_gettid) }) as Tid
}

#[cfg(target_os = "macos")]
fn os_thread_id() -> Tid {
    let mut tid: u64 = 0;
    unsafe {
        libc::pthread_threadid_np(libc::pthread_self(), &mut tid);
    }

    tid
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn os_thread_id() -> Tid {
    // no portable OS call; hash the runtime thread handle
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current()
        .id()
        .hash(&mut hasher);

    hasher.finish()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SourceLocation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An immutable call-site triple captured at macro expansion by
/// [`source_location!`].
///
/// [`source_location!`]: crate::source_location
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceLocation {
    file_name: &'static str,
    function_name: &'static str,
    line: u32,
}

impl SourceLocation {
    pub const fn new(
        file_name: &'static str,
        function_name: &'static str,
        line: u32,
    ) -> SourceLocation {
        SourceLocation {
            file_name,
            function_name,
            line,
        }
    }

    #[inline(always)]
    pub const fn file_name(&self) -> &'static str {
        self.file_name
    }

    #[inline(always)]
    pub const fn function_name(&self) -> &'static str {
        self.function_name
    }

    #[inline(always)]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_name, self.function_name, self.line)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One log record.
///
/// Constructed in the producer thread; immutable after construction.
/// Exactly one reference is pushed into a logger's ring buffer, the
/// worker consumes that reference and passes it to each sink in order.
/// The record is destroyed when the last [`LogEventP`] drops.
#[derive(Debug)]
pub struct LogEvent {
    /// severity of this record
    level: LogLevel,
    /// wall-clock instant plus local zone offset, resolved at construction
    timestamp: DateTimeL,
    /// call site captured at macro expansion
    loc: SourceLocation,
    /// OS thread id of the submitting thread
    thread_id: Tid,
    /// already-rendered payload string
    msg: String,
}

impl LogEvent {
    pub fn new(
        level: LogLevel,
        msg: String,
        loc: SourceLocation,
    ) -> LogEvent {
        LogEvent {
            level,
            timestamp: timestamp_now(),
            loc,
            thread_id: thread_id(),
            msg,
        }
    }

    #[inline(always)]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    #[inline(always)]
    pub const fn timestamp(&self) -> &DateTimeL {
        &self.timestamp
    }

    #[inline(always)]
    pub const fn source_location(&self) -> &SourceLocation {
        &self.loc
    }

    #[inline(always)]
    pub const fn thread_id(&self) -> Tid {
        self.thread_id
    }

    #[inline(always)]
    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }
}

/// Thread-safe Atomic Reference Counting pointer to a [`LogEvent`].
pub type LogEventP = Arc<LogEvent>;
pub type LogEventPOpt = Option<LogEventP>;
