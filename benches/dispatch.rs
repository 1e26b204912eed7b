// benches/dispatch.rs
//! Namespace dispatch benchmarks
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use monkey_patcher::{Instance, MemorySink, Patcher, Prototype, SourceObject, Value};

fn source_with(count: usize) -> SourceObject {
    (0..count).fold(SourceObject::new(), |source, i| {
        source.with_method(format!("method_{}", i), move |this, _| {
            Value::Int(this.get_field("base").as_int() + i as i64)
        })
    })
}

fn patched_instance(count: usize) -> Instance {
    let proto = Prototype::new("Bench");
    Patcher::new(&proto, "ext")
        .with_sink(MemorySink::new())
        .patch(&source_with(count))
        .unwrap();

    let instance = Instance::new(&proto);
    instance.set_field("base", Value::Int(1));
    instance
}

fn benchmark_direct_method(c: &mut Criterion) {
    let proto = Prototype::new("Bench").with_method("method_0", |this, _| this.get_field("base"));
    let instance = Instance::new(&proto);
    instance.set_field("base", Value::Int(1));

    c.bench_function("direct_method", |b| {
        b.iter(|| instance.call(black_box("method_0"), &[]))
    });
}

fn benchmark_namespace_call(c: &mut Criterion) {
    let instance = patched_instance(1);

    c.bench_function("namespace_call", |b| {
        b.iter(|| {
            instance
                .namespace(black_box("ext"))
                .unwrap()
                .call(black_box("method_0"), &[])
        })
    });
}

fn benchmark_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("namespace_table_size");

    for count in [1usize, 10, 100].iter() {
        let instance = patched_instance(*count);
        let last = format!("method_{}", count - 1);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                instance
                    .namespace("ext")
                    .unwrap()
                    .call(black_box(&last), &[])
            })
        });
    }

    group.finish();
}

fn benchmark_patch(c: &mut Criterion) {
    let source = source_with(10);

    c.bench_function("patch_10_methods", |b| {
        b.iter(|| {
            let proto = Prototype::new("Fresh");
            Patcher::new(&proto, "ext")
                .with_sink(MemorySink::new())
                .patch(black_box(&source))
        })
    });
}

criterion_group!(
    benches,
    benchmark_direct_method,
    benchmark_namespace_call,
    benchmark_table_size,
    benchmark_patch,
);

criterion_main!(benches);
