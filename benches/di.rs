use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use service_lifetimes::{
    add_memory_output, configure_services, Lifetime, Resolver, ServiceCollection, WorkService,
};
use std::time::Instant;

fn work_provider() -> service_lifetimes::ServiceProvider {
    let mut sc = ServiceCollection::new();
    add_memory_output(&mut sc);
    configure_services(&mut sc);
    sc.build()
}

fn bench_singleton_hit(c: &mut Criterion) {
    let sp = work_provider();
    let _ = sp.get_trait::<dyn WorkService>().unwrap();

    c.bench_function("singleton_hit_work_service", |b| {
        b.iter(|| black_box(sp.get_trait::<dyn WorkService>().unwrap()))
    });
}

fn bench_lifetimes(c: &mut Criterion) {
    #[derive(Clone)]
    struct Payload {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("resolve_by_lifetime");
    for lifetime in Lifetime::ALL {
        let mut sc = ServiceCollection::new();
        match lifetime {
            Lifetime::Transient => sc.add_transient_factory::<Payload, _>(|_| Payload { data: [0; 64] }),
            Lifetime::Scoped => sc.add_scoped_factory::<Payload, _>(|_| Payload { data: [0; 64] }),
            Lifetime::Singleton => sc.add_singleton_factory::<Payload, _>(|_| Payload { data: [0; 64] }),
        };
        let sp = sc.build();
        let scope = sp.create_scope();

        group.bench_with_input(BenchmarkId::from_parameter(lifetime), &lifetime, |b, _| {
            b.iter(|| black_box(scope.get::<Payload>().unwrap().data[0]))
        });
    }
    group.finish();
}

fn bench_request_scope(c: &mut Criterion) {
    let sp = work_provider();

    c.bench_function("scope_resolve_all_work_services", |b| {
        b.iter(|| {
            let scope = sp.create_scope();
            let services = scope.get_all_trait::<dyn WorkService>().unwrap();
            black_box(services.len());
        })
    });
}

fn bench_concurrent_scopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_scopes");
    let sp = work_provider();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("resolve_all_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let sp_ref = &sp;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let scope = sp_ref.create_scope();
                                    black_box(scope.get_all_trait::<dyn WorkService>().unwrap().len());
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_lifetimes,
    bench_request_scope,
    bench_concurrent_scopes
);
criterion_main!(benches);
