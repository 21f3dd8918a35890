use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wirebox::{typed, Container, Context, ErrorKind, Lifetime, Shared, TypeToken};

struct A {
    id: usize,
}

struct B {
    a: Arc<A>,
}

#[derive(Debug)]
struct BackendError;

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("backend offline")
    }
}

impl std::error::Error for BackendError {}

#[test]
fn singleton_dependency_is_built_once_for_transient_consumers() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let container = Container::new();
    container
        .add_service(move || Arc::new(A { id: counter.fetch_add(1, Ordering::SeqCst) }))
        .set_name("Svc")
        .as_singleton();
    container
        .add_fallible_service(|a: Arc<A>| Ok::<_, BackendError>(Arc::new(B { a })))
        .set_name("B");

    let first: Arc<B> = typed::get_by_name(&container, "B");
    let second: Arc<B> = typed::get_by_name(&container, "B");

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.a, &second.a));
    assert_eq!(first.a.id, 0);
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let svc: Arc<A> = typed::get_by_name(&container, "Svc");
    assert!(Arc::ptr_eq(&svc, &first.a));
}

#[test]
fn failing_fallible_constructor_surfaces_its_error() {
    let container = Container::new();
    container.add_service(|| Arc::new(A { id: 0 })).as_singleton();
    container
        .add_fallible_service(|_: Arc<A>| Err::<Arc<B>, _>(BackendError))
        .set_name("B");

    let err = container.try_get_service("B").unwrap_err();
    assert!(err.kind == ErrorKind::BuildFailed);
    assert!(err.message.contains("failed to build B"));
    assert!(err.message.contains("backend offline"));
}

#[test]
fn scoped_dependency_resolved_first_is_reused() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let container = Container::new();
    container
        .add_service(move || Arc::new(A { id: counter.fetch_add(1, Ordering::SeqCst) }))
        .as_scoped();
    container
        .add_service(|a: Arc<A>| Arc::new(B { a }))
        .as_scoped();

    let scope = container.create_scope();
    let a: Arc<A> = typed::get(&scope);
    let b: Arc<B> = typed::get(&scope);

    assert!(Arc::ptr_eq(&a, &b.a));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let other = container.create_scope();
    let other_b: Arc<B> = typed::get(&other);
    assert!(!Arc::ptr_eq(&other_b.a, &a));
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn lifetimes_across_container_and_scopes() {
    let container = Container::new();
    container.add_service(|| Arc::new(A { id: 1 })).set_name("single").as_singleton();
    container.add_service(|| Arc::new(A { id: 2 })).set_name("fresh").as_transient();
    container.add_service(|| Arc::new(A { id: 3 })).set_name("scoped").as_scoped();

    let first = container.create_scope();
    let second = container.create_scope();

    assert!(Shared::ptr_eq(&first.get_service("single"), &second.get_service("single")));
    assert!(!Shared::ptr_eq(&first.get_service("fresh"), &first.get_service("fresh")));
    assert!(Shared::ptr_eq(&first.get_service("scoped"), &first.get_service("scoped")));
    assert!(!Shared::ptr_eq(&first.get_service("scoped"), &second.get_service("scoped")));
}

#[test]
fn default_names_follow_the_pointee() {
    let container = Container::new();
    let by_arc = container.add_service(|| Arc::new(A { id: 0 }));
    let by_value = container.add_service(|| String::from("plain"));

    assert_eq!(by_arc.name(), std::any::type_name::<A>());
    assert_eq!(by_value.name(), std::any::type_name::<String>());
    assert!(by_arc.lifetime() == Lifetime::Transient);
    assert_eq!(by_arc.token(), TypeToken::of::<Arc<A>>());
}

#[test]
#[should_panic(expected = "failed to resolve")]
fn missing_dependency_is_fatal() {
    let container = Container::new();
    container.add_service(|a: Arc<A>| Arc::new(B { a })).set_name("B");
    container.get_service("B");
}

#[test]
fn registration_rejects_bad_shapes_immediately() {
    let container = Container::new();

    assert!(container.try_add_service(|| ()).is_err());
    assert!(container.try_add_service(|| (1u8, 2u8, 3u8)).is_err());
    assert!(container.try_add_service(|| BackendError).is_err());
    assert!(container.try_add_service(|| (1u8, 2u8)).is_err());
    assert!(container.is_empty());
}

#[test]
fn clean_is_idempotent_and_singletons_rebuild() {
    let disposed = Arc::new(AtomicUsize::new(0));
    let counter = disposed.clone();

    let container = Container::new();
    container
        .add_service(|| Arc::new(A { id: 7 }))
        .set_name("single")
        .as_singleton()
        .set_typed_dispose::<Arc<A>, _>(move |_, a| {
            assert_eq!(a.id, 7);
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let before = container.get_service("single");
    let ctx = Context::background();
    container.clean(&ctx);
    container.clean(&ctx);
    assert_eq!(disposed.load(Ordering::SeqCst), 1);

    let after = container.get_service("single");
    assert!(!Shared::ptr_eq(&before, &after));
}
