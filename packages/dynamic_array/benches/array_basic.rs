//! Basic benchmarks for the `dynamic_array` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use dynamic_array::DynamicArray;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("array_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(DynamicArray::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_one");
    group.bench_function("push_one", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(DynamicArray::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                array.push(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_one_preallocated");
    group.bench_function("push_one_preallocated", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| DynamicArray::<TestItem>::with_capacity(1))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                array.push(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut array = DynamicArray::new();
            array.push(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array.first().copied());
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pop_one");
    group.bench_function("pop_one", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| {
                let mut array = DynamicArray::with_capacity(1);
                array.push(TEST_VALUE);
                array
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                _ = black_box(array.pop());
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("array_slow");

    let allocs_op = allocs.operation("push_10k_growing");
    group.bench_function("push_10k_growing", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(DynamicArray::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..10_000 {
                    array.push(black_box(TEST_VALUE));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_10k_preallocated");
    group.bench_function("push_10k_preallocated", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| DynamicArray::<TestItem>::with_capacity(10_000))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..10_000 {
                    array.push(black_box(TEST_VALUE));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_front_1k");
    group.bench_function("insert_front_1k", |b| {
        // Every insert at index zero shifts the whole tail, which stresses the
        // element relocation paths rather than the growth policy.
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| DynamicArray::<TestItem>::with_capacity(1000))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..1000 {
                    _ = black_box(array.insert(0, black_box(TEST_VALUE)));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("remove_front_1k");
    group.bench_function("remove_front_1k", |b| {
        b.iter_custom(|iters| {
            let mut arrays = iter::repeat_with(|| {
                let mut array = DynamicArray::with_capacity(1000);
                for _ in 0..1000 {
                    array.push(TEST_VALUE);
                }
                array
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for array in &mut arrays {
                for _ in 0..1000 {
                    _ = black_box(array.remove(0));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("iterate_10k");
    group.bench_function("iterate_10k", |b| {
        b.iter_custom(|iters| {
            let mut array = DynamicArray::with_capacity(10_000);
            for _ in 0..10_000 {
                array.push(TEST_VALUE);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(array.iter().sum::<TestItem>());
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
