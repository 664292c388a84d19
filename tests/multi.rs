use service_lifetimes::{DiError, Lifetime, Resolver, ServiceCollection};
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Alpha;
impl Plugin for Alpha {
    fn name(&self) -> &'static str {
        "alpha"
    }
}

struct Beta;
impl Plugin for Beta {
    fn name(&self) -> &'static str {
        "beta"
    }
}

struct Gamma;
impl Plugin for Gamma {
    fn name(&self) -> &'static str {
        "gamma"
    }
}

fn plugins() -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.add_trait_factory::<dyn Plugin, _>(Lifetime::Transient, |_| Arc::new(Alpha) as Arc<dyn Plugin>);
    sc.add_trait_factory::<dyn Plugin, _>(Lifetime::Scoped, |_| Arc::new(Beta) as Arc<dyn Plugin>);
    sc.add_trait_factory::<dyn Plugin, _>(Lifetime::Singleton, |_| Arc::new(Gamma) as Arc<dyn Plugin>);
    sc
}

#[test]
fn test_all_registrations_coexist_in_order() {
    let sc = plugins();
    assert_eq!(sc.len(), 3);

    let sp = sc.build();
    let scope = sp.create_scope();
    let names: Vec<_> = scope
        .get_all_trait::<dyn Plugin>()
        .unwrap()
        .iter()
        .map(|p| p.name())
        .collect();

    assert_eq!(names, ["alpha", "beta", "gamma"]);
}

#[test]
fn test_each_entry_keeps_its_lifetime() {
    let sp = plugins().build();
    let scope1 = sp.create_scope();
    let scope2 = sp.create_scope();

    let a = scope1.get_all_trait::<dyn Plugin>().unwrap();
    let b = scope1.get_all_trait::<dyn Plugin>().unwrap();
    let c = scope2.get_all_trait::<dyn Plugin>().unwrap();

    assert!(!Arc::ptr_eq(&a[0], &b[0]));
    assert!(Arc::ptr_eq(&a[1], &b[1]));
    assert!(!Arc::ptr_eq(&a[1], &c[1]));
    assert!(Arc::ptr_eq(&a[2], &c[2]));
}

#[test]
fn test_single_resolution_picks_last_registration() {
    let sp = plugins().build();
    let scope = sp.create_scope();

    let single = scope.get_required_trait::<dyn Plugin>();
    let all = scope.get_all_trait::<dyn Plugin>().unwrap();

    assert_eq!(single.name(), "gamma");
    assert!(Arc::ptr_eq(&single, &all[2]));
    assert!(Arc::ptr_eq(&single, &sp.get_required_trait::<dyn Plugin>()));
}

#[test]
fn test_single_resolution_uses_last_entry_lifetime() {
    let mut sc = ServiceCollection::new();
    sc.add_trait_factory::<dyn Plugin, _>(Lifetime::Singleton, |_| Arc::new(Alpha) as Arc<dyn Plugin>);
    sc.add_trait_factory::<dyn Plugin, _>(Lifetime::Scoped, |_| Arc::new(Beta) as Arc<dyn Plugin>);

    let sp = sc.build();
    assert!(matches!(sp.get_trait::<dyn Plugin>(), Err(DiError::WrongLifetime(_))));

    let scope = sp.create_scope();
    let a = scope.get_required_trait::<dyn Plugin>();
    assert_eq!(a.name(), "beta");
    assert!(Arc::ptr_eq(&a, &scope.get_required_trait::<dyn Plugin>()));
}

#[test]
fn test_root_cannot_resolve_scoped_entries() {
    let sp = plugins().build();
    assert!(matches!(sp.get_all_trait::<dyn Plugin>(), Err(DiError::WrongLifetime(_))));
}

#[test]
fn test_no_registrations_yields_empty_list() {
    let sp = ServiceCollection::new().build();
    assert!(sp.get_all_trait::<dyn Plugin>().unwrap().is_empty());
    assert!(matches!(sp.get_trait::<dyn Plugin>(), Err(DiError::NotFound(_))));
}

#[test]
fn test_existing_implementations() {
    let mut sc = ServiceCollection::new();
    let alpha: Arc<dyn Plugin> = Arc::new(Alpha);
    sc.add_trait_implementation(alpha.clone(), Lifetime::Singleton);
    sc.add_trait_implementation(Arc::new(Beta) as Arc<dyn Plugin>, Lifetime::Singleton);

    let sp = sc.build();
    let all = sp.get_all_trait::<dyn Plugin>().unwrap();
    assert!(Arc::ptr_eq(&all[0], &alpha));
    assert_eq!(all[1].name(), "beta");

}

#[test]
fn test_descriptors_list_every_entry() {
    let descriptors = plugins().get_service_descriptors();
    let lifetimes: Vec<_> = descriptors.iter().map(|d| d.lifetime).collect();

    assert!(descriptors.iter().all(|d| d.is_multi_binding()));
    assert_eq!(lifetimes, Lifetime::ALL);
    assert_eq!(
        descriptors.iter().map(|d| d.key.index()).collect::<Vec<_>>(),
        [Some(0), Some(1), Some(2)]
    );
}
