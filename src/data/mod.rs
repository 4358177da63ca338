// src/data/mod.rs

//! The `data` module is the passive data containers of the pipeline:
//! the [`LogLevel`] ordering, timestamp capture, and the immutable
//! [`LogEvent`] record that producer threads hand to a logger.
//!
//! ## Definitions of data
//!
//! ### LogEvent
//!
//! A `LogEvent` is one log record:
//!
//! * constructed in the submitting (producer) thread.
//! * immutable after construction.
//! * shared by reference count ([`LogEventP`]); one reference is pushed
//!   into a logger's ring buffer, the worker consumes that reference and
//!   passes it to each sink in order. The event is destroyed when the last
//!   reference is dropped.
//!
//! ### Level
//!
//! A [`LogLevel`] is a position in the total order
//! `Debug < Info < Notice < Warn < Error < Fatal`. A logger's threshold
//! compares by this order.
//!
//! [`LogLevel`]: crate::data::level::LogLevel
//! [`LogEvent`]: crate::data::event::LogEvent
//! [`LogEventP`]: crate::data::event::LogEventP

pub mod datetime;
pub mod event;
pub mod level;
