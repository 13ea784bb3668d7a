//! Resolver and name-table benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use posixbind_bench::passwd_fixture;
use posixbind_core::resource::resolve_limit;
use posixbind_core::{LimitPair, LimitRequest, LimitSetting, LimitValue, ResourceKind};

fn bench_resolve_limit(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_limit");
    let current = LimitPair::new(LimitValue::Finite(1024), LimitValue::Finite(4096));

    group.bench_function("complete_request", |b| {
        let request = LimitRequest::new(LimitSetting::Value(64), LimitSetting::Unbounded);
        b.iter(|| {
            let pair = resolve_limit(ResourceKind::Nofile, criterion::black_box(request), |_| Ok(current));
            criterion::black_box(pair)
        });
    });

    group.bench_function("soft_only_request", |b| {
        let request = LimitRequest::soft(LimitSetting::Value(64));
        b.iter(|| {
            let pair = resolve_limit(ResourceKind::Nofile, criterion::black_box(request), |_| Ok(current));
            criterion::black_box(pair)
        });
    });

    group.finish();
}

fn bench_resource_names(c: &mut Criterion) {
    c.bench_function("resource_from_name", |b| {
        b.iter(|| {
            for name in ["core", "nofile", "stack", "bogus"] {
                criterion::black_box(ResourceKind::from_name(criterion::black_box(name)));
            }
        });
    });
}

fn bench_passwd_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("passwd_lookup_by_name");
    for &n in &[10usize, 100, 1000] {
        let content = passwd_fixture(n, "target");
        group.bench_with_input(BenchmarkId::new("files", n), &content, |b, content| {
            b.iter(|| criterion::black_box(posixbind_core::pwd::lookup_by_name(content, "target")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve_limit, bench_resource_names, bench_passwd_lookup);
criterion_main!(benches);
