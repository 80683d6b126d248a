//! Routing benchmarks.
//!
//! Run with: `cargo bench -p sextant-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use sextant_router::{Route, Router};

fn build_router(num_routes: usize, cache_capacity: usize) -> Router<String> {
    let mut router = Router::new().with_cache_capacity(cache_capacity);

    for i in 0..num_routes / 3 {
        router
            .add(Route::new(format!("/api/v1/resource{i}"), format!("list{i}")).method(Method::GET))
            .expect("static route");
        router
            .add(
                Route::new(format!("/api/v1/resource{i}/<id:int>"), format!("get{i}"))
                    .method(Method::GET),
            )
            .expect("param route");
        router
            .add(
                Route::new(
                    format!("/api/v1/org/<org:slug>/resource{i}/<?id:int>"),
                    format!("org{i}"),
                )
                .method(Method::GET),
            )
            .expect("nested route");
    }

    router.freeze();
    router
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100, 0);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/resource20")));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100, 0);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/resource25/12345")));
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let router = build_router(100, 0);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| {
            black_box(router.resolve(&Method::GET, "/api/v1/org/acme-corp/resource10/12345"))
        });
    });
}

fn bench_cached_match(c: &mut Criterion) {
    let router = build_router(100, 1024);

    c.bench_function("cached_nested_param_match", |b| {
        b.iter(|| {
            black_box(router.resolve(&Method::GET, "/api/v1/org/acme-corp/resource10/12345"))
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100, 0);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/nonexistent/path")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [30, 150, 300, 1500] {
        let router = build_router(num_routes, 0);

        group.bench_with_input(
            BenchmarkId::new("static_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}", n / 6);
                b.iter(|| black_box(router.resolve(&Method::GET, &path)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("param_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(router.resolve(&Method::GET, &path)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_nested_param_match,
    bench_cached_match,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
