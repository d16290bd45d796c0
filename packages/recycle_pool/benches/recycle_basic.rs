//! Basic benchmarks for the `recycle_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::any::Any;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use recycle_pool::{LocalRecyclePool, RecyclePool};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[derive(Default)]
struct Message {
    payload: [u64; 16],
}

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp_cycle");

    group.bench_function("box_new_baseline", |b| {
        b.iter(|| {
            let message = Box::new(Message::default());
            black_box(message.payload[0]);
        });
    });

    group.bench_function("allocate_free", |b| {
        let pool = RecyclePool::new();
        pool.preallocate(Message::default, 100);

        b.iter(|| {
            let message = pool.allocate::<Message>();
            black_box(message.payload[0]);
            pool.free(message);
        });
    });

    group.bench_function("allocate_free_any", |b| {
        let pool = RecyclePool::new();
        pool.preallocate(Message::default, 100);

        b.iter(|| {
            let message: Box<dyn Any + Send> = pool.allocate::<Message>();
            pool.free_any(black_box(message));
        });
    });

    group.bench_function("local_allocate_free", |b| {
        let pool = LocalRecyclePool::new();
        pool.preallocate(Message::default, 100);

        b.iter(|| {
            let message = pool.allocate::<Message>();
            black_box(message.payload[0]);
            pool.free(message);
        });
    });

    group.finish();

    let mut types_group = c.benchmark_group("rp_types");

    types_group.bench_function("ten_types", |b| {
        let pool = RecyclePool::new();

        b.iter(|| {
            pool.free(pool.allocate::<u8>());
            pool.free(pool.allocate::<u16>());
            pool.free(pool.allocate::<u32>());
            pool.free(pool.allocate::<u64>());
            pool.free(pool.allocate::<i8>());
            pool.free(pool.allocate::<i16>());
            pool.free(pool.allocate::<i32>());
            pool.free(pool.allocate::<i64>());
            pool.free(pool.allocate::<String>());
            pool.free(pool.allocate::<Message>());
        });
    });

    types_group.finish();
}
