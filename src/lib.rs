// src/lib.rs

//! _sallib_, the speedy asynchronous logger.
//!
//! An asynchronous, low-latency logging library for robotics and
//! real-time control workloads. Producer threads construct a log event
//! through the [`log_debug!`] … [`log_fatal!`] macros and submit it
//! through a bounded lock-free ring buffer; a per-logger worker thread
//! drains the queue, formats each event, and fans it out to the logger's
//! sinks (console, rotating file, remote WebSocket endpoint).
//!
//! Submitting never blocks: under overload the ring drops events rather
//! than grow, so memory stays bounded.
//!
//! ```no_run
//! use sallib::loggers::registry::get_logger;
//! use sallib::log_info;
//!
//! log_info!(get_logger("root"), "hello, sallib!");
//! ```
//!
//! [`log_debug!`]: crate::log_debug
//! [`log_fatal!`]: crate::log_fatal

pub mod common;
pub mod data;
pub mod debug;
pub mod format;
pub mod loggers;
pub mod macros;
pub mod queue;
pub mod settings;
pub mod sinks;
#[cfg(test)]
pub mod tests;
