use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_minifut::Promise;
use std::thread;

fn same_thread_roundtrip_benchmark(c: &mut Criterion) {
    c.bench_function("promise_set_get", |b| {
        b.iter(|| {
            let (promise, future) = Promise::pair();
            promise.set(black_box(42u64)).expect("set");
            black_box(future.get().expect("get"))
        })
    });
}

fn cross_thread_roundtrip_benchmark(c: &mut Criterion) {
    c.bench_function("promise_cross_thread", |b| {
        b.iter(|| {
            let (promise, future) = Promise::pair();
            let setter = thread::spawn(move || {
                promise.set(7u64).expect("set");
            });
            let value = black_box(future.get().expect("get"));
            setter.join().expect("setter thread");
            value
        })
    });
}

criterion_group!(
    benches,
    same_thread_roundtrip_benchmark,
    cross_thread_roundtrip_benchmark
);
criterion_main!(benches);
