// src/data/datetime.rs

//! Wall-clock timestamp capture for log events.
//!
//! Events carry a [`DateTimeL`]: the system instant plus the local
//! time-zone offset, both resolved once at event construction in the
//! producer thread. The consumer side only renders.

extern crate chrono;
pub use chrono::{
    DateTime,
    Local,
    Offset,
    TimeZone,
    Utc,
};

/// The `DateTime` type used throughout _sallib_; a wall-clock instant
/// carrying the local time-zone offset.
pub type DateTimeL = DateTime<Local>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// `strftime`-style pattern for rendering a [`DateTimeL`]; ISO-ish local
/// time with the zone label, microsecond precision.
///
/// See the [`chrono` strftime documentation].
///
/// [`chrono` strftime documentation]: https://docs.rs/chrono/latest/chrono/format/strftime/index.html
pub const DATETIME_RENDER_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.6f %:z";

/// Capture the wall-clock instant and local zone offset.
///
/// Called once per [`LogEvent`] construction, in the producer thread.
///
/// [`LogEvent`]: crate::data::event::LogEvent
#[inline(always)]
pub fn timestamp_now() -> DateTimeL {
    Local::now()
}

/// Render `dt` with [`DATETIME_RENDER_PATTERN`].
pub fn datetime_to_string(dt: &DateTimeL) -> String {
    dt.format(DATETIME_RENDER_PATTERN)
        .to_string()
}
