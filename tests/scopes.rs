use service_lifetimes::{DiError, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

struct RequestId(usize);

fn counting_collection() -> (ServiceCollection, Arc<AtomicUsize>) {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();
    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<RequestId, _>(move |_| RequestId(counter.fetch_add(1, Ordering::SeqCst)));
    (sc, created)
}

#[test]
fn test_scoped_same_within_scope() {
    let (sc, created) = counting_collection();
    let sp = sc.build();
    let scope = sp.create_scope();

    let a = scope.get_required::<RequestId>();
    let b = scope.get_required::<RequestId>();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(scope.cached_count(), 1);
}

#[test]
fn test_scoped_differs_across_scopes() {
    let (sc, _) = counting_collection();
    let sp = sc.build();
    let scope1 = sp.create_scope();
    let scope2 = sp.create_scope();

    let a = scope1.get_required::<RequestId>();
    let b = scope2.get_required::<RequestId>();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(a.0, b.0);
}

#[test]
fn test_scoped_from_root_is_an_error() {
    let (sc, created) = counting_collection();
    let sp = sc.build();

    assert!(matches!(sp.get::<RequestId>(), Err(DiError::WrongLifetime(_))));
    assert_eq!(created.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scoped_depends_on_singleton() {
    struct Pool;
    struct Session {
        pool: Arc<Pool>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_singleton(Pool);
    sc.add_scoped_factory::<Session, _>(|r| Session {
        pool: r.get_required::<Pool>(),
    });

    let sp = sc.build();
    let s1 = sp.create_scope().get_required::<Session>();
    let s2 = sp.create_scope().get_required::<Session>();

    assert!(!Arc::ptr_eq(&s1, &s2));
    assert!(Arc::ptr_eq(&s1.pool, &s2.pool));
}

#[test]
fn test_scope_outlives_provider_handle() {
    let (sc, _) = counting_collection();
    let sp = sc.build();
    let scope = sp.create_scope();
    drop(sp);

    let a = scope.get_required::<RequestId>();
    assert!(Arc::ptr_eq(&a, &scope.get_required::<RequestId>()));
}

#[test]
fn test_scope_shared_between_threads() {
    let (sc, created) = counting_collection();
    let sp = sc.build();
    let scope = Arc::new(sp.create_scope());

    let first = scope.get_required::<RequestId>();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scope = scope.clone();
            thread::spawn(move || scope.get_required::<RequestId>())
        })
        .collect();

    for handle in handles {
        assert!(Arc::ptr_eq(&first, &handle.join().unwrap()));
    }
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_root_accessor() {
    let sp = ServiceCollection::new().build();
    let scope = sp.create_scope();
    assert_eq!(scope.root().registration_count(), 0);
}
