//! Benchmarks for resolving an invocation against a declared event table.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plugctx::core::PipelineStage;
use plugctx::events::{EventKey, EventMatcher, RegisteredEvent};

fn event_table(size: usize) -> Vec<RegisteredEvent> {
    let mut events: Vec<RegisteredEvent> = (0..size)
        .map(|i| {
            RegisteredEvent::new(PipelineStage::PreOperation, format!("Message{i}"))
                .for_entity(format!("entity{i}"))
        })
        .collect();
    events.push(RegisteredEvent::any(PipelineStage::PostOperation));
    events
}

fn event_matching_benchmark(c: &mut Criterion) {
    let events = event_table(32);
    let matcher = EventMatcher::new(&events);

    let exact = EventKey::new(PipelineStage::PreOperation, "Message31", "entity31");
    c.bench_function("resolve_exact", |b| {
        b.iter(|| matcher.resolve(black_box(&exact), "bench::Plugin"))
    });

    let wildcard = EventKey::new(PipelineStage::PostOperation, "Assign", "account");
    c.bench_function("resolve_wildcard", |b| {
        b.iter(|| matcher.resolve(black_box(&wildcard), "bench::Plugin"))
    });

    let miss = EventKey::new(PipelineStage::PreValidation, "Delete", "account");
    c.bench_function("resolve_unregistered", |b| {
        b.iter(|| matcher.resolve(black_box(&miss), "bench::Plugin").is_err())
    });
}

criterion_group!(benches, event_matching_benchmark);
criterion_main!(benches);
