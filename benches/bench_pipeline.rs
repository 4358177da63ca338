// benches/bench_pipeline.rs
//
// benchmark the submit hot path: the bare ring buffer, event
// construction, rendering, and the whole logger pipeline draining into a
// discarding sink

#![allow(non_upper_case_globals)]

use ::criterion::{
    black_box,
    criterion_group,
    criterion_main,
    Criterion,
};

use ::sallib::common::LogResult;
use ::sallib::data::event::{LogEvent, LogEventP};
use ::sallib::data::level::LogLevel;
use ::sallib::format::factory::ComponentFactory;
use ::sallib::format::formatter::Formatter;
use ::sallib::loggers::logger::{Logger, LoggerP};
use ::sallib::queue::ringbuffer::RingBuffer;
use ::sallib::sinks::Sink;
use ::sallib::source_location;

use std::sync::Arc;

/// discards rendered events, so the pipeline is measured, not a device
struct DiscardSink {}

impl Sink for DiscardSink {
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()> {
        black_box(event.msg());

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

fn new_event(msg: &str) -> LogEventP {
    Arc::new(LogEvent::new(LogLevel::Info, String::from(msg), source_location!()))
}

fn bench_ringbuffer_push_pop(c: &mut Criterion) {
    let rb: RingBuffer<u64> = RingBuffer::new(1024).unwrap();
    c.bench_function("ringbuffer_push_pop", |b| {
        b.iter(|| {
            let _ = rb.push(black_box(1u64));
            black_box(rb.pop());
        })
    });
}

fn bench_event_construction(c: &mut Criterion) {
    c.bench_function("event_construction", |b| {
        b.iter(|| black_box(new_event("steady-state payload string")))
    });
}

fn bench_format_event(c: &mut Criterion) {
    let formatter: Formatter = Formatter::default();
    let event: LogEventP = new_event("steady-state payload string");
    c.bench_function("format_event_default_components", |b| {
        b.iter(|| black_box(formatter.format_event(&event)))
    });
}

fn bench_submit_drain(c: &mut Criterion) {
    let logger: LoggerP = match Logger::with_capacity("bench", LogLevel::Debug, 8192) {
        Ok(val) => val,
        Err(err) => panic!("Logger::with_capacity failed: {}", err),
    };
    logger
        .add_sink(Arc::new(DiscardSink {}))
        .unwrap();
    c.bench_function("logger_submit", |b| {
        b.iter(|| {
            logger
                .submit(new_event("steady-state payload string"))
                .unwrap();
        })
    });
    logger.flush().unwrap();
}

criterion_group!(
    benches,
    bench_ringbuffer_push_pop,
    bench_event_construction,
    bench_format_event,
    bench_submit_drain,
);
criterion_main!(benches);
