// src/sinks/mod.rs

//! "Sinks" consume formatted log events.
//!
//! ## Overview of sinks
//!
//! * A [`ConsoleSink`] writes newline-terminated records to stdout or
//!   stderr through the locked handle, so concurrent events cannot tear.
//! * A [`FileSink`] writes through a user-space buffer to a file and
//!   rotates it by size.
//! * A [`WebSocketSink`] relays MessagePack-encoded records to a remote
//!   endpoint and accepts threshold control commands.
//!
//! Every sink owns one [`Formatter`] behind a sink-local mutex
//! ([`FormatterCell`]); `append` renders through it, and a new formatter
//! may be installed at any time with [`Sink::set_formatter`].
//!
//! `append` failures are surfaced to the caller; the logger worker
//! isolates them per event and reports to stderr rather than aborting.
//!
//! [`ConsoleSink`]: crate::sinks::console::ConsoleSink
//! [`FileSink`]: crate::sinks::file::FileSink
//! [`WebSocketSink`]: crate::sinks::websocket::WebSocketSink
//! [`Formatter`]: crate::format::formatter::Formatter

pub mod console;
pub mod file;
pub mod websocket;

use crate::common::LogResult;
use crate::data::event::{LogEvent, LogEventP};
use crate::format::formatter::Formatter;

use std::sync::{Arc, Mutex};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The common sink contract.
///
/// Implementations must be safe to call from the logger worker thread
/// while other threads mutate the sink (formatter swap, limit changes).
pub trait Sink: Send + Sync {
    /// Render `event` through the sink's formatter and emit it to the
    /// backing medium.
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()>;

    /// Push everything buffered down to the backing medium. Idempotent
    /// and blocking.
    fn flush(&self) -> LogResult<()>;

    /// Install a new formatter; takes the sink-local formatter mutex.
    fn set_formatter(
        &self,
        formatter: Formatter,
    );
}

/// Thread-safe Atomic Reference Counting pointer to a [`Sink`].
pub type SinkP = Arc<dyn Sink>;
pub type SinkPs = Vec<SinkP>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FormatterCell
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The mutexed formatter slot every sink embeds.
#[derive(Debug)]
pub struct FormatterCell {
    formatter: Mutex<Formatter>,
}

impl FormatterCell {
    pub fn new(formatter: Formatter) -> FormatterCell {
        FormatterCell {
            formatter: Mutex::new(formatter),
        }
    }

    /// Render `event` under the formatter mutex.
    pub fn render(
        &self,
        event: &LogEvent,
    ) -> String {
        self.formatter
            .lock()
            .unwrap()
            .format_event(event)
    }

    /// Replace the held formatter.
    pub fn replace(
        &self,
        formatter: Formatter,
    ) {
        *self
            .formatter
            .lock()
            .unwrap() = formatter;
    }

    /// Run `call` with the held formatter, under the formatter mutex.
    pub fn with<R>(
        &self,
        call: impl FnOnce(&Formatter) -> R,
    ) -> R {
        call(&self
            .formatter
            .lock()
            .unwrap())
    }
}

impl Default for FormatterCell {
    /// A cell over the settings document, defaulted when unusable.
    fn default() -> FormatterCell {
        FormatterCell::new(Formatter::from_settings_or_default())
    }
}
