//! Criterion benchmarks for sink_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sink_logger::prelude::*;
use std::sync::Arc;

// ============================================================================
// Scope Benchmarks
// ============================================================================

fn bench_message_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_scope");
    group.throughput(Throughput::Elements(1));

    let counter = CountingSink::new();

    group.bench_function("plain_text", |b| {
        b.iter(|| {
            MessageScope::new("bench.rs", 1, LogLevel::Info, &counter)
                .append(black_box("Plain message"));
        });
    });

    group.bench_function("formatted", |b| {
        b.iter(|| {
            sink_logger::info!(counter, "user {} did {}", black_box(42), black_box("login"));
        });
    });

    group.bench_function("statically_filtered", |b| {
        b.iter(|| {
            sink_logger::trace!(counter, "never formatted {}", black_box(1));
        });
    });

    group.finish();
}

// ============================================================================
// Composite Benchmarks
// ============================================================================

fn bench_composites(c: &mut Criterion) {
    let mut group = c.benchmark_group("composites");
    group.throughput(Throughput::Elements(1));
    let record = LogRecord::finished("bench.rs", 1, LogLevel::Info, "composite");

    let tee = TeeLogger::new(
        ChildSink::owned(CountingSink::new()),
        ChildSink::owned(CountingSink::new()),
    );
    group.bench_function("tee", |b| {
        b.iter(|| black_box(tee.accept(&record)));
    });

    let mux: MultiplexLogger = (0..8)
        .map(|_| ChildSink::owned(CountingSink::new()))
        .collect();
    group.bench_function("multiplex_8", |b| {
        b.iter(|| black_box(mux.accept(&record)));
    });

    let filter = LevelFilterLogger::new(LogLevel::Error, ChildSink::owned(CountingSink::new()));
    group.bench_function("level_filter_drop", |b| {
        b.iter(|| black_box(filter.accept(&record)));
    });

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    let record = LogRecord::finished("src/server/handler.rs", 88, LogLevel::Warn, "slow request");

    group.bench_function("reference_layout", |b| {
        let format = RecordFormat::new();
        b.iter(|| black_box(format.render(&record)));
    });

    group.bench_function("with_timestamp", |b| {
        let format = RecordFormat::new().with_timestamp(TimestampFormat::Iso8601);
        b.iter(|| black_box(format.render(&record)));
    });

    group.bench_function("string_sink", |b| {
        let sink = StringSink::new();
        b.iter(|| {
            let _ = sink.accept(&record);
            sink.clear();
        });
    });

    group.finish();
}

// ============================================================================
// Background Delivery Benchmarks
// ============================================================================

fn bench_async_logger(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logger");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("enqueue_1000_and_flush", |b| {
        let counter = Arc::new(CountingSink::new());
        let logger = AsyncLogger::new(Arc::clone(&counter)).unwrap();
        let record = LogRecord::finished("bench.rs", 1, LogLevel::Info, "queued");
        b.iter(|| {
            for _ in 0..1000 {
                let _ = logger.accept(&record);
            }
            logger.flush().unwrap();
        });
        logger.stop().unwrap();
    });

    group.bench_function("start_stop", |b| {
        b.iter(|| {
            let logger = AsyncLogger::new(ChildSink::owned(CountingSink::new())).unwrap();
            logger.stop().unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_message_scope,
    bench_composites,
    bench_formatting,
    bench_async_logger
);
criterion_main!(benches);
