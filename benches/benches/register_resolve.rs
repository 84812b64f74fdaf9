// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use arbor_tree::{ComponentDesc, Registry};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Descriptions for a root with `groups` groups of `per_group` commands each.
fn descs(groups: usize, per_group: usize) -> Vec<ComponentDesc> {
    let mut out = Vec::with_capacity(1 + groups * (per_group + 1));
    out.push(ComponentDesc::root("app"));
    for g in 0..groups {
        out.push(ComponentDesc::module(format!("g{g}")).parent("app"));
        for m in 0..per_group {
            out.push(ComponentDesc::module(format!("g{g}m{m}")).parent(format!("g{g}")));
        }
    }
    out
}

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("register");
    for (groups, per_group) in [(4_usize, 4_usize), (16, 16)] {
        let count = 1 + groups * (per_group + 1);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("parent_first_{count}"), |b| {
            b.iter_batched(
                || descs(groups, per_group),
                |descs| {
                    let mut registry = Registry::new();
                    for d in descs {
                        black_box(registry.register(d).unwrap());
                    }
                    registry
                },
                BatchSize::SmallInput,
            );
        });
        // Every component waits for its parent and is adopted later.
        group.bench_function(format!("child_first_{count}"), |b| {
            b.iter_batched(
                || {
                    let mut d = descs(groups, per_group);
                    d.reverse();
                    d
                },
                |descs| {
                    let mut registry = Registry::new();
                    for d in descs {
                        black_box(registry.register(d).unwrap());
                    }
                    registry
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_register);
criterion_main!(benches);
