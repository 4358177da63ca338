// src/tests/common.rs

//! Fixtures shared among tests: event helpers and in-memory sinks.

use crate::common::{Count, LogResult};
use crate::data::event::{LogEvent, LogEventP};
use crate::data::level::LogLevel;
use crate::format::formatter::Formatter;
use crate::sinks::Sink;
use crate::source_location;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A [`LogEvent`] with the caller's level and message, call site here.
pub fn new_test_event(
    level: LogLevel,
    msg: &str,
) -> LogEventP {
    Arc::new(LogEvent::new(level, String::from(msg), source_location!()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CaptureSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A sink recording every event it receives, in order.
pub struct CaptureSink {
    events: Mutex<Vec<LogEventP>>,
    flush_count: AtomicU64,
}

impl CaptureSink {
    pub fn new() -> Arc<CaptureSink> {
        Arc::new(CaptureSink {
            events: Mutex::new(Vec::new()),
            flush_count: AtomicU64::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .len()
    }

    pub fn events(&self) -> Vec<LogEventP> {
        self.events
            .lock()
            .unwrap()
            .clone()
    }

    pub fn flush_count(&self) -> Count {
        self.flush_count
            .load(Ordering::Relaxed)
    }
}

impl Sink for CaptureSink {
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(event.clone());

        Ok(())
    }

    fn flush(&self) -> LogResult<()> {
        self.flush_count
            .fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    fn set_formatter(
        &self,
        _formatter: Formatter,
    ) {
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// NullSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A sink counting appends and discarding events; a stand-in for
/// "console redirected to `/dev/null`" in burst tests.
pub struct NullSink {
    appended: AtomicU64,
}

impl NullSink {
    pub fn new() -> Arc<NullSink> {
        Arc::new(NullSink {
            appended: AtomicU64::new(0),
        })
    }

    pub fn appended(&self) -> Count {
        self.appended
            .load(Ordering::Relaxed)
    }
}

impl Sink for NullSink {
    fn append(
        &self,
        _event: &LogEventP,
    ) -> LogResult<()> {
        self.appended
            .fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    fn flush(&self) -> LogResult<()> {
        Ok(())
    }

    fn set_formatter(
        &self,
        _formatter: Formatter,
    ) {
    }
}
