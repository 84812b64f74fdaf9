// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use arbor_events::{EventEmitter, Phase, listener};
use arbor_tree::{ComponentDesc, ComponentId, Registry, Value};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// A chain `c0 <- c1 <- ... <- c{depth-1}` with one counting listener per component.
fn chain(depth: usize, hits: &Rc<Cell<u64>>) -> (Registry, ComponentId) {
    let mut registry = Registry::new();
    let mut leaf = registry.register(ComponentDesc::root("c0")).unwrap();
    for i in 1..depth {
        leaf = registry
            .register(ComponentDesc::module(format!("c{i}")).parent(format!("c{}", i - 1)))
            .unwrap();
    }
    for id in registry.path(leaf) {
        let hits = hits.clone();
        registry
            .on(
                id,
                "tick",
                listener(move |_: &[Value]| {
                    hits.set(hits.get() + 1);
                    Ok(())
                }),
                Phase::Post,
            )
            .unwrap();
    }
    (registry, leaf)
}

fn bench_emitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter");
    for n in [1_usize, 8, 64] {
        let hits = Rc::new(Cell::new(0_u64));
        let mut emitter: EventEmitter<[Value]> = EventEmitter::new();
        for i in 0..n {
            let hits = hits.clone();
            let phase = if i % 2 == 0 { Phase::Pre } else { Phase::Post };
            emitter.on(
                "tick",
                listener(move |_: &[Value]| {
                    hits.set(hits.get() + 1);
                    Ok(())
                }),
                phase,
            );
        }
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("emit_listeners_{n}"), |b| {
            let payload = [Value::Int(1)];
            b.iter(|| black_box(emitter.emit("tick", &payload).unwrap()));
        });
    }
    group.bench_function("once_register_emit", |b| {
        b.iter_batched(
            EventEmitter::<[Value]>::new,
            |mut emitter| {
                for _ in 0..16 {
                    emitter.once("tick", listener(|_: &[Value]| Ok(())), Phase::Post);
                }
                black_box(emitter.emit("tick", &[]).unwrap());
                emitter
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_bubble(c: &mut Criterion) {
    let mut group = c.benchmark_group("bubble");
    for depth in [2_usize, 8, 32] {
        let hits = Rc::new(Cell::new(0_u64));
        let (mut registry, leaf) = chain(depth, &hits);
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("emit_depth_{depth}"), |b| {
            let payload = [Value::from(leaf), Value::from("data")];
            b.iter(|| black_box(registry.emit(leaf, "tick", &payload).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_emitter, bench_bubble);
criterion_main!(benches);
