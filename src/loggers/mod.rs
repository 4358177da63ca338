// src/loggers/mod.rs

//! The asynchronous [`Logger`], its worker thread, and the process-wide
//! [`LoggerRegistry`].
//!
//! ## Overview
//!
//! ```text
//!  User code (frontend)              Logger (backend)
//!    producer threads                  worker thread
//!       submit()          ━━ ring ━▶      pop()  ──▶ sinks
//! ```
//!
//! * A [`Logger`] owns a bounded ring buffer and one worker thread; the
//!   worker drains the ring and fans each event out to the logger's
//!   sinks in registration order.
//! * A logger with no sinks delegates each submit to its parent; the
//!   registry wires every created logger to the root logger.
//! * The [`LoggerRegistry`] is the process-wide name → logger map; the
//!   free function [`get_logger`] reaches the singleton.
//!
//! [`Logger`]: crate::loggers::logger::Logger
//! [`LoggerRegistry`]: crate::loggers::registry::LoggerRegistry
//! [`get_logger`]: crate::loggers::registry::get_logger

pub mod logger;
pub mod registry;
