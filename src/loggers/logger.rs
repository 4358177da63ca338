// src/loggers/logger.rs

//! The asynchronous [`Logger`]: a bounded ring buffer, a lazily-started
//! worker thread, an ordered sink list, and delegation to a parent
//! logger.

use crate::common::{Count, LogError, LogResult};
use crate::data::event::LogEventP;
use crate::data::level::{AtomicLogLevel, LogLevel};
use crate::e_err;
use crate::queue::ringbuffer::RingBuffer;
use crate::sinks::{SinkP, SinkPs};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock, Weak};
use std::thread;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Logger
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default ring buffer capacity of a [`Logger`].
///
/// Size to the workload: with many producers and a slow sink set a small
/// capacity drops sooner; 1024 or more suits sustained bursts.
pub const RING_CAPACITY_DEFAULT: usize = 256;

/// What the worker thread blocks on, separated from [`Logger`] so the
/// worker can wait without keeping its logger alive (the worker holds
/// this strongly but the logger only weakly; see [`worker_main`]).
struct WorkerSignal {
    /// `false → true` elects the one producer that starts the worker;
    /// `true → false` asks the worker to stop
    running: AtomicBool,
    /// `true` while the worker is inside a drain iteration; lets `flush`
    /// wait out an event that was popped but not yet appended
    delivering: AtomicBool,
    /// pairs with `wakeup`
    mtx: Mutex<()>,
    /// notified on push and on stop
    wakeup: Condvar,
}

/// An asynchronous logger.
///
/// Producer threads call [`submit`]; the single worker thread drains the
/// ring buffer and fans each event out to every sink in registration
/// order. Submitting never blocks: a full ring drops the event and
/// counts it ([`queue_full_count`]).
///
/// A logger with no sinks delegates each submit to its parent
/// ([`set_parent`], one-shot); with no parent either, submit fails.
///
/// Dropping the last handle stops the worker after the ring has been
/// drained; every queued event reaches the sinks before the logger is
/// gone.
///
/// [`submit`]: Logger::submit
/// [`queue_full_count`]: Logger::queue_full_count
/// [`set_parent`]: Logger::set_parent
pub struct Logger {
    name: String,
    /// events strictly below this never enter the ring
    threshold: AtomicLogLevel,
    ring: RingBuffer<LogEventP>,
    /// ordered sink list; mutated under the write lock, the worker
    /// snapshots under the read lock
    sinks: RwLock<SinkPs>,
    /// delegation target when `sinks` is empty; set at most once
    parent: RwLock<Option<LoggerP>>,
    signal: Arc<WorkerSignal>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    /// pushes rejected by a full ring
    queue_full: AtomicU64,
    /// handed to the worker thread so it cannot keep the logger alive
    self_weak: Weak<Logger>,
}

/// Thread-safe Atomic Reference Counting pointer to a [`Logger`].
pub type LoggerP = Arc<Logger>;

impl Logger {
    /// A logger with the default ring capacity.
    pub fn new(
        name: &str,
        threshold: LogLevel,
    ) -> LoggerP {
        match Logger::with_capacity(name, threshold, RING_CAPACITY_DEFAULT) {
            Ok(val) => val,
            // the default capacity is a nonzero power of two
            Err(_) => unreachable!("RING_CAPACITY_DEFAULT rejected"),
        }
    }

    /// A logger whose ring holds at least `capacity` events
    /// (rounded up to a power of two).
    pub fn with_capacity(
        name: &str,
        threshold: LogLevel,
        capacity: usize,
    ) -> LogResult<LoggerP> {
        defn!("({:?}, {}, capacity={})", name, threshold, capacity);
        let ring: RingBuffer<LogEventP> = RingBuffer::new(capacity)?;
        let logger: LoggerP = Arc::new_cyclic(|self_weak| Logger {
            name: name.to_string(),
            threshold: AtomicLogLevel::new(threshold),
            ring,
            sinks: RwLock::new(SinkPs::new()),
            parent: RwLock::new(None),
            signal: Arc::new(WorkerSignal {
                running: AtomicBool::new(false),
                delivering: AtomicBool::new(false),
                mtx: Mutex::new(()),
                wakeup: Condvar::new(),
            }),
            worker: Mutex::new(None),
            queue_full: AtomicU64::new(0),
            self_weak: self_weak.clone(),
        });
        defx!("({:?})", name);

        Ok(logger)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline(always)]
    pub fn threshold_level(&self) -> LogLevel {
        self.threshold.load()
    }

    pub fn set_threshold_level(
        &self,
        threshold: LogLevel,
    ) {
        self.threshold.store(threshold);
    }

    /// Install the delegation target. One-shot: installing twice is
    /// [`InvalidParameter`], as is parenting a logger to itself.
    /// The registry guarantees an acyclic parent graph.
    ///
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn set_parent(
        &self,
        parent: LoggerP,
    ) -> LogResult<()> {
        if std::ptr::eq(self, Arc::as_ptr(&parent)) {
            return Err(LogError::InvalidParameter(format!(
                "logger {:?} cannot be its own parent",
                self.name,
            )));
        }
        let mut slot = self
            .parent
            .write()
            .unwrap();
        if slot.is_some() {
            return Err(LogError::InvalidParameter(format!(
                "parent of logger {:?} has already been set",
                self.name,
            )));
        }
        *slot = Some(parent);

        Ok(())
    }

    /// The delegation target, if installed.
    pub fn parent(&self) -> Option<LoggerP> {
        self.parent
            .read()
            .unwrap()
            .clone()
    }

    /// Append `sink` to the sink list. Registering the same sink
    /// instance twice is [`InvalidParameter`].
    ///
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn add_sink(
        &self,
        sink: SinkP,
    ) -> LogResult<()> {
        let mut sinks = self
            .sinks
            .write()
            .unwrap();
        for existing in sinks.iter() {
            if Arc::ptr_eq(existing, &sink) {
                return Err(LogError::InvalidParameter(format!(
                    "sink already registered with logger {:?}",
                    self.name,
                )));
            }
        }
        sinks.push(sink);

        Ok(())
    }

    /// Remove the sink instance `sink`. Removing a sink that was never
    /// registered is [`InvalidParameter`].
    ///
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn remove_sink(
        &self,
        sink: &SinkP,
    ) -> LogResult<()> {
        let mut sinks = self
            .sinks
            .write()
            .unwrap();
        match sinks
            .iter()
            .position(|existing| Arc::ptr_eq(existing, sink))
        {
            Some(at) => {
                sinks.remove(at);

                Ok(())
            }
            None => Err(LogError::InvalidParameter(format!(
                "sink was not registered with logger {:?}",
                self.name,
            ))),
        }
    }

    pub fn clear_sinks(&self) {
        self.sinks
            .write()
            .unwrap()
            .clear();
    }

    pub fn has_sinks(&self) -> bool {
        !self
            .sinks
            .read()
            .unwrap()
            .is_empty()
    }

    /// Start the worker thread if it is not running. Idempotent; a race
    /// of producers elects exactly one starter via compare-exchange.
    pub fn ensure_started(&self) {
        if self
            .signal
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        defo!("logger {:?} starting worker", self.name);

        let weak: Weak<Logger> = self.self_weak.clone();
        let signal: Arc<WorkerSignal> = self.signal.clone();
        match thread::Builder::new()
            .name(format!("sallib-{}", self.name))
            .spawn(move || worker_main(weak, signal))
        {
            Ok(handle) => {
                *self
                    .worker
                    .lock()
                    .unwrap() = Some(handle);
            }
            Err(err) => {
                e_err!("cannot spawn worker thread for logger {:?}: {}", self.name, err);
                self.signal
                    .running
                    .store(false, Ordering::Release);
            }
        }
    }

    /// Submit one event.
    ///
    /// Events strictly below the threshold return without work. With
    /// sinks attached the event goes into the ring (a full ring drops it
    /// and bumps [`queue_full_count`]); with no sinks the submit
    /// delegates to the parent; with neither this is
    /// [`InvalidParameter`] ("root logger not set").
    ///
    /// [`queue_full_count`]: Logger::queue_full_count
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn submit(
        &self,
        event: LogEventP,
    ) -> LogResult<()> {
        if event.level() < self.threshold.load() {
            return Ok(());
        }

        let has_sinks: bool = self.has_sinks();
        if has_sinks {
            self.ensure_started();
            match self.ring.push(event) {
                Ok(()) => {
                    let _guard = self
                        .signal
                        .mtx
                        .lock()
                        .unwrap();
                    self.signal
                        .wakeup
                        .notify_one();
                }
                Err(_dropped) => {
                    // bounded memory beats guaranteed delivery here
                    self.queue_full
                        .fetch_add(1, Ordering::Relaxed);
                }
            }

            return Ok(());
        }

        let parent: Option<LoggerP> = self.parent();
        match parent {
            Some(parent) => parent.submit(event),
            None => Err(LogError::InvalidParameter(format!(
                "logger {:?} has no sinks and the root logger is not set",
                self.name,
            ))),
        }
    }

    /// Wait (yielding) until the worker has drained the ring, then flush
    /// every sink under the exclusive lock.
    ///
    /// Returns the *last* sink flush error encountered, if any.
    pub fn flush(&self) -> LogResult<()> {
        while (self.ring.size() > 0
            || self
                .signal
                .delivering
                .load(Ordering::Acquire))
            && self
                .signal
                .running
                .load(Ordering::Acquire)
        {
            {
                let _guard = self
                    .signal
                    .mtx
                    .lock()
                    .unwrap();
                self.signal
                    .wakeup
                    .notify_one();
            }
            thread::yield_now();
        }

        let sinks = self
            .sinks
            .write()
            .unwrap();
        let mut result: LogResult<()> = Ok(());
        for sink in sinks.iter() {
            if let Err(err) = sink.flush() {
                result = Err(err);
            }
        }

        result
    }

    /// Pushes rejected by a full ring since construction.
    pub fn queue_full_count(&self) -> Count {
        self.queue_full
            .load(Ordering::Relaxed)
    }

    /// Events currently queued (approximate).
    pub fn ring_size(&self) -> usize {
        self.ring.size()
    }

    /// The ring capacity.
    pub fn ring_capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Fan `event` out to a snapshot of the sink list, isolating per-sink
    /// failures.
    fn deliver(
        &self,
        event: &LogEventP,
    ) {
        let sinks: SinkPs = self
            .sinks
            .read()
            .unwrap()
            .clone();
        for sink in sinks.iter() {
            if let Err(err) = sink.append(event) {
                e_err!("sink append failed for logger {:?}: {}", self.name, err);
            }
        }
    }
}

impl Drop for Logger {
    /// Stop the worker, then deliver whatever is still queued and flush
    /// the sinks. Runs when the last [`LoggerP`] drops; the worker holds
    /// only a [`Weak`] so it cannot prevent this.
    fn drop(&mut self) {
        defn!("({:?})", self.name);
        self.signal
            .running
            .store(false, Ordering::Release);
        let handle_opt = self
            .worker
            .lock()
            .unwrap()
            .take();
        let on_worker_thread: bool = handle_opt
            .as_ref()
            .map(|handle| handle.thread().id() == thread::current().id())
            .unwrap_or(false);
        if on_worker_thread {
            // the worker dropped the last handle to its own logger; it
            // cannot join itself, and it may already hold the signal
            // mutex (drop inside the wait predicate)
            defo!("logger {:?} dropped on its own worker thread", self.name);
        } else {
            {
                let _guard = self
                    .signal
                    .mtx
                    .lock()
                    .unwrap();
                self.signal
                    .wakeup
                    .notify_all();
            }
            if let Some(handle) = handle_opt {
                if handle.join().is_err() {
                    e_err!("worker thread of logger {:?} panicked", self.name);
                }
            }
        }

        // the worker is gone; deliver the remainder inline
        while let Some(event) = self.ring.pop() {
            self.deliver(&event);
        }
        let sinks = self
            .sinks
            .read()
            .unwrap();
        for sink in sinks.iter() {
            if let Err(err) = sink.flush() {
                e_err!("sink flush failed for logger {:?}: {}", self.name, err);
            }
        }
        defx!("({:?})", self.name);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// worker thread
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Worker thread body.
///
/// The worker closes over a weak logger reference; on wake it upgrades
/// for the duration of one drain iteration and exits when the upgrade
/// fails (logger gone) or when asked to stop with an empty ring. Holding
/// only a weak reference outside drain iterations breaks the reference
/// cycle the closure would otherwise create, and lets `Drop` run while
/// the worker is parked.
fn worker_main(
    weak: Weak<Logger>,
    signal: Arc<WorkerSignal>,
) {
    defn!();
    loop {
        // park until there is work or a stop request; the predicate peeks
        // at the ring through a transient upgrade
        {
            let guard = signal
                .mtx
                .lock()
                .unwrap();
            let _guard = signal
                .wakeup
                .wait_while(guard, |_| {
                    if !signal
                        .running
                        .load(Ordering::Acquire)
                    {
                        return false;
                    }
                    match weak.upgrade() {
                        Some(logger) => logger.ring.size() == 0,
                        None => false,
                    }
                })
                .unwrap();
        }

        let logger: LoggerP = match weak.upgrade() {
            Some(val) => val,
            None => break,
        };
        if !signal
            .running
            .load(Ordering::Acquire)
            && logger.ring.size() == 0
        {
            break;
        }

        signal
            .delivering
            .store(true, Ordering::Release);
        while let Some(event) = logger.ring.pop() {
            logger.deliver(&event);
        }
        signal
            .delivering
            .store(false, Ordering::Release);
    }
    defx!();
}
