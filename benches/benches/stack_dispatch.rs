// Copyright 2025 the Colloquy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use colloquy_stack::{Handler, HandlerRef, HandlerStack};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

type Stack = HandlerStack<u64, ()>;

/// Claims events divisible by `modulus`.
struct Divides(u64);

impl Handler<u64, ()> for Divides {
    fn handle(&self, _cx: &(), event: &u64) -> bool {
        *event % self.0 == 0
    }
}

fn handler(modulus: u64) -> HandlerRef<u64, ()> {
    Arc::new(Divides(modulus))
}

/// `roots` root handlers plus a chain of `depth` active handlers, each pushed under the last.
fn build(roots: usize, depth: usize) -> (Stack, Vec<HandlerRef<u64, ()>>) {
    let s = Stack::new();
    for _ in 0..roots {
        s.add_root(handler(u64::MAX));
    }
    let mut chain: Vec<HandlerRef<u64, ()>> = Vec::with_capacity(depth);
    for i in 0..depth {
        let h = handler(i as u64 + 2);
        let parent = chain.last().map(|p| &**p);
        s.push(h.clone(), parent);
        chain.push(h);
    }
    (s, chain)
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for &depth in &[1_usize, 8, 64] {
        let (s, _chain) = build(4, depth);
        group.throughput(Throughput::Elements(1));
        // Zero is claimed by the newest handler; a large prime walks the whole chain.
        group.bench_function(format!("claimed_depth{depth}"), |b| {
            b.iter(|| black_box(s.handle(&(), black_box(&0))));
        });
        group.bench_function(format!("fallback_depth{depth}"), |b| {
            b.iter(|| black_box(s.handle(&(), black_box(&1_000_003))));
        });
    }
    group.finish();
}

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop");
    for &depth in &[8_usize, 64, 256] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("push_chain_n{depth}"), |b| {
            b.iter(|| black_box(build(0, depth)));
        });
        group.bench_function(format!("cascade_pop_n{depth}"), |b| {
            b.iter_batched(
                || build(0, depth),
                |(s, chain)| {
                    s.pop(&(), &*chain[0]);
                    black_box(s.len())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_push_pop);
criterion_main!(benches);
