// src/sinks/console.rs

//! Sink for writing log events to stdout or stderr.

use crate::common::{LogError, LogResult, NLu8};
use crate::data::event::LogEventP;
use crate::format::formatter::Formatter;
use crate::sinks::{FormatterCell, Sink};

use std::io::Write;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConsoleSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which process stream a [`ConsoleSink`] writes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    /// Parse `"stdout"` or `"stderr"`; anything else is
    /// [`InvalidParameter`].
    ///
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn from_name(name: &str) -> LogResult<ConsoleTarget> {
        match name {
            "stdout" => Ok(ConsoleTarget::Stdout),
            "stderr" => Ok(ConsoleTarget::Stderr),
            _ => Err(LogError::InvalidParameter(format!(
                "invalid stream type {:?}, use \"stdout\" or \"stderr\"",
                name,
            ))),
        }
    }

    /// The pseudo-path used in `IoFailure` errors for this stream.
    const fn pseudo_path(&self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "<stdout>",
            ConsoleTarget::Stderr => "<stderr>",
        }
    }
}

/// Line-oriented sink over stdout or stderr.
///
/// Each event is the rendered string followed by a newline, written in
/// one `write_all` through the locked handle so interleaving of
/// concurrent writers cannot tear a single event.
pub struct ConsoleSink {
    formatter: FormatterCell,
    target: ConsoleTarget,
}

impl ConsoleSink {
    /// A sink over stdout, with the settings-document formatter.
    pub fn stdout() -> ConsoleSink {
        ConsoleSink::with_target(ConsoleTarget::Stdout)
    }

    /// A sink over stderr, with the settings-document formatter.
    pub fn stderr() -> ConsoleSink {
        ConsoleSink::with_target(ConsoleTarget::Stderr)
    }

    /// A sink over the stream named by `name` (`"stdout"`/`"stderr"`).
    pub fn from_name(name: &str) -> LogResult<ConsoleSink> {
        Ok(ConsoleSink::with_target(ConsoleTarget::from_name(name)?))
    }

    pub fn with_target(target: ConsoleTarget) -> ConsoleSink {
        ConsoleSink {
            formatter: FormatterCell::default(),
            target,
        }
    }

    /// Same sink with `formatter` pre-installed.
    pub fn with_formatter(
        self,
        formatter: Formatter,
    ) -> ConsoleSink {
        self.formatter
            .replace(formatter);

        self
    }

    #[inline(always)]
    pub const fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn write_line(
        &self,
        line: &str,
    ) -> std::io::Result<()> {
        let mut buffer: Vec<u8> = Vec::with_capacity(line.len() + 1);
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(NLu8);
        // one `write_all` under the handle lock; no tearing
        match self.target {
            ConsoleTarget::Stdout => {
                let mut handle = std::io::stdout().lock();
                handle.write_all(buffer.as_slice())
            }
            ConsoleTarget::Stderr => {
                let mut handle = std::io::stderr().lock();
                handle.write_all(buffer.as_slice())
            }
        }
    }
}

impl Sink for ConsoleSink {
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()> {
        let line: String = self
            .formatter
            .render(event);
        self.write_line(line.as_str())
            .map_err(|err| LogError::IoFailure {
                path: self
                    .target
                    .pseudo_path()
                    .to_string(),
                source: err,
            })
    }

    fn flush(&self) -> LogResult<()> {
        let result: std::io::Result<()> = match self.target {
            ConsoleTarget::Stdout => std::io::stdout()
                .lock()
                .flush(),
            ConsoleTarget::Stderr => std::io::stderr()
                .lock()
                .flush(),
        };
        result.map_err(|err| LogError::IoFailure {
            path: self
                .target
                .pseudo_path()
                .to_string(),
            source: err,
        })
    }

    fn set_formatter(
        &self,
        formatter: Formatter,
    ) {
        self.formatter
            .replace(formatter);
    }
}
