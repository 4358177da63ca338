// src/loggers/registry.rs

//! The process-wide name → logger map and its singleton accessor
//! [`get_logger`].

use crate::data::level::LogLevel;
use crate::loggers::logger::{Logger, LoggerP};
use crate::sinks::console::ConsoleSink;
use crate::sinks::SinkP;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

extern crate lazy_static;
use lazy_static::lazy_static;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LoggerRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The name of the root logger, the ultimate fallback target for any
/// logger lacking sinks.
pub const ROOT_LOGGER_NAME: &str = "root";

/// Maps names to loggers and owns the root logger.
///
/// The root logger is created at registry construction with a single
/// stdout console sink and a `Debug` threshold, and its worker is
/// started. [`get`] returns an existing logger or creates-and-inserts
/// one atomically, parented to root.
///
/// Dropping a registry drops every logger; each logger's drop delivers
/// its queued events and joins its worker. Children hold their parent
/// strongly, so root is torn down last.
///
/// [`get`]: LoggerRegistry::get
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, LoggerP>>,
    root: LoggerP,
}

impl LoggerRegistry {
    /// A registry with a freshly-bootstrapped root logger.
    pub fn new() -> LoggerRegistry {
        defn!();
        let root: LoggerP = Logger::new(ROOT_LOGGER_NAME, LogLevel::Debug);
        let console: SinkP = Arc::new(ConsoleSink::stdout());
        if let Err(err) = root.add_sink(console) {
            // a fresh logger has no sinks; not reachable
            crate::debug_panic!("root console sink registration failed: {}", err);
        }
        root.ensure_started();

        let mut loggers: HashMap<String, LoggerP> = HashMap::new();
        loggers.insert(ROOT_LOGGER_NAME.to_string(), root.clone());
        defx!();

        LoggerRegistry {
            loggers: RwLock::new(loggers),
            root,
        }
    }

    /// The root logger.
    pub fn root(&self) -> LoggerP {
        self.root.clone()
    }

    /// The logger named `name`, created on first use.
    ///
    /// A created logger has no sinks and delegates to root; a race of
    /// creators is resolved by a double-checked insert, every caller
    /// gets the same winner.
    pub fn get(
        &self,
        name: &str,
    ) -> LoggerP {
        if name == ROOT_LOGGER_NAME {
            return self.root();
        }

        {
            let loggers = self
                .loggers
                .read()
                .unwrap();
            if let Some(logger) = loggers.get(name) {
                return logger.clone();
            }
        }

        defo!("create logger {:?}", name);
        let logger: LoggerP = Logger::new(name, LogLevel::Debug);
        if let Err(err) = logger.set_parent(self.root()) {
            // a fresh logger has no parent; not reachable
            crate::debug_panic!("parenting new logger {:?} failed: {}", name, err);
        }

        let mut loggers = self
            .loggers
            .write()
            .unwrap();
        match loggers.entry(name.to_string()) {
            // another producer won the race
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                entry.insert(logger.clone());

                logger
            }
        }
    }

    /// Count of loggers in the map (root included).
    pub fn len(&self) -> usize {
        self.loggers
            .read()
            .unwrap()
            .len()
    }

    #[doc(hidden)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LoggerRegistry {
    fn default() -> LoggerRegistry {
        LoggerRegistry::new()
    }
}

impl Drop for LoggerRegistry {
    fn drop(&mut self) {
        defn!();
        // each dropped logger delivers its queue and joins its worker;
        // children drop before `self.root` releases the root
        self.loggers
            .write()
            .unwrap()
            .clear();
        defx!();
    }
}

lazy_static! {
    /// The process-wide registry behind [`get_logger`].
    static ref REGISTRY: LoggerRegistry = LoggerRegistry::new();
}

/// The process-wide logger named `name`, created on first use; pass
/// [`ROOT_LOGGER_NAME`] for the root logger.
pub fn get_logger(name: &str) -> LoggerP {
    REGISTRY.get(name)
}

/// The process-wide root logger.
pub fn root_logger() -> LoggerP {
    REGISTRY.root()
}
