// src/macros.rs

//! The producer-facing logging macros.
//!
//! Six level-specific macros take a message expression
//! (`log_debug!` … `log_fatal!`) and six take a format string with
//! arguments (`log_debugf!` … `log_fatalf!`). Each captures the call
//! site implicitly, renders the message in the submitting thread,
//! constructs a [`LogEvent`], and submits it to the given logger.
//!
//! The threshold is checked *before* the event is constructed, so a
//! filtered call costs one atomic load.
//!
//! ```no_run
//! use sallib::loggers::registry::get_logger;
//! use sallib::{log_info, log_warnf};
//!
//! let logger = get_logger("motion");
//! log_info!(logger, "controller online");
//! log_warnf!(logger, "joint {} near limit: {:.2} rad", 3, 2.93);
//! ```
//!
//! [`LogEvent`]: crate::data::event::LogEvent

/// Capture the call site as a [`SourceLocation`]:
/// file, enclosing function path, line.
///
/// [`SourceLocation`]: crate::data::event::SourceLocation
#[macro_export]
macro_rules! source_location {
    () => {{
        // the function path of the expansion site, via the type name of a
        // local item
        fn __loc() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name: &'static str = __type_name_of(__loc);
        let name: &'static str = &name[..name.len() - "::__loc".len()];

        $crate::data::event::SourceLocation::new(file!(), name, line!())
    }};
}

/// Base macro of the producer API: threshold gate, event construction,
/// submit. Submit failures are reported to stderr, never panicked.
#[macro_export]
macro_rules! log_with_level {
    ($logger:expr, $level:expr, $msg:expr) => {{
        let logger = &$logger;
        let level: $crate::data::level::LogLevel = $level;
        if level >= logger.threshold_level() {
            let event = $crate::data::event::LogEvent::new(
                level,
                ::std::string::String::from($msg),
                $crate::source_location!(),
            );
            if let Err(err) = logger.submit(::std::sync::Arc::new(event)) {
                $crate::e_err!("submit to logger {:?} failed: {}", logger.name(), err);
            }
        }
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Debug, $msg)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Info, $msg)
    };
}

#[macro_export]
macro_rules! log_notice {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Notice, $msg)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Warn, $msg)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Error, $msg)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $msg:expr) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Fatal, $msg)
    };
}

#[macro_export]
macro_rules! log_debugf {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Debug, format!($($args)+))
    };
}

#[macro_export]
macro_rules! log_infof {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Info, format!($($args)+))
    };
}

#[macro_export]
macro_rules! log_noticef {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Notice, format!($($args)+))
    };
}

#[macro_export]
macro_rules! log_warnf {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Warn, format!($($args)+))
    };
}

#[macro_export]
macro_rules! log_errorf {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Error, format!($($args)+))
    };
}

#[macro_export]
macro_rules! log_fatalf {
    ($logger:expr, $($args:tt)+) => {
        $crate::log_with_level!($logger, $crate::data::level::LogLevel::Fatal, format!($($args)+))
    };
}
