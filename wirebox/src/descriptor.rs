//! Service descriptors: one registered constructor plus its lifetime policy.
//!
//! A [`ServiceDescriptor`] knows how to build one service and, for
//! singletons, holds the built instance. It never looks up other services
//! itself: [`ServiceDescriptor::build`] receives a resolver callback and asks
//! it for each constructor parameter. The container and scopes decide what
//! that callback does.
//!
//! # Locking
//!
//! Each descriptor has two locks:
//!
//! - `settings` (reader/writer) guards name, lifetime and disposer, so name
//!   scans never wait on a build in progress.
//! - `cached` (exclusive) is held for the whole of [`build`](ServiceDescriptor::build),
//!   which serializes concurrent builds of the same descriptor. Builds of
//!   different descriptors run in parallel.
//!
//! Without the `cycle-detection` feature, a constructor that (indirectly)
//! depends on its own type deadlocks on that exclusive lock.

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::constructor::{Constructor, Resolver};
use crate::context::Context;
use crate::error::Error;
use crate::lifetime::Lifetime;
use crate::runtime::{Instance, Shared, Store};
use crate::signature::{validate_fallible_output, validate_output};
use crate::token::TypeToken;

#[cfg(feature = "cycle-detection")]
use crate::resolve_guard::ResolveGuard;

/// Clean-up callback for a cached instance.
pub type Disposer = dyn Fn(&Context, &Instance) + Send + Sync;

struct Settings {
    name: String,
    lifetime: Lifetime,
    disposer: Option<Shared<Disposer>>,
}

/// Registration record: constructor, identity and lifetime policy.
pub struct ServiceDescriptor {
    token: TypeToken,
    constructor: Constructor,
    settings: Store<Settings>,
    cached: Mutex<Option<Instance>>,
}

impl ServiceDescriptor {
    /// Validates the constructor's return shape and wraps it.
    ///
    /// The default name is the produced type's name, with pointer-like
    /// wrappers stripped. The default lifetime is transient.
    pub fn new(constructor: Constructor) -> Result<Self, Error> {
        let token = constructor.output();
        if constructor.is_fallible() {
            validate_fallible_output(&token)?;
        } else {
            validate_output(&token)?;
        }

        Ok(Self {
            token,
            constructor,
            settings: Store::new(Settings {
                name: token.default_service_name(),
                lifetime: Lifetime::default(),
                disposer: None,
            }),
            cached: Mutex::new(None),
        })
    }

    pub fn name(&self) -> String {
        self.settings.read().name.clone()
    }

    pub(crate) fn has_name(&self, name: &str) -> bool {
        self.settings.read().name == name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.settings.read().lifetime
    }

    /// Type of the value this descriptor produces.
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// Constructor parameter types, in declaration order.
    pub fn dependencies(&self) -> &[TypeToken] {
        self.constructor.parameters()
    }

    /// Whether an instance is currently cached.
    pub fn is_cached(&self) -> bool {
        self.cached.lock().is_some()
    }

    /// Overrides the name; an empty name leaves it unchanged.
    pub fn set_name(&self, name: &str) {
        if !name.is_empty() {
            self.settings.write().name = name.to_string();
        }
    }

    /// Changing the lifetime never clears an already cached instance.
    pub fn set_lifetime(&self, lifetime: Lifetime) {
        self.settings.write().lifetime = lifetime;
    }

    pub fn set_disposer(&self, disposer: Shared<Disposer>) {
        self.settings.write().disposer = Some(disposer);
    }

    /// Builds the service, asking `resolve` for each constructor parameter.
    ///
    /// A cached singleton is returned as is, without touching `resolve` or
    /// the constructor. Any parameter failure aborts the build with that
    /// failure. A successful singleton build is cached before returning.
    pub fn build(&self, resolve: &mut Resolver<'_>) -> Result<Instance, Error> {
        #[cfg(feature = "cycle-detection")]
        let _guard = ResolveGuard::push(self.key(), &self.name())?;

        let mut cached = self.cached.lock();
        let lifetime = self.lifetime();

        if lifetime.is_singleton() {
            if let Some(instance) = cached.as_ref() {
                #[cfg(feature = "tracing")]
                trace!(service = %self.token, "singleton cache hit");

                return Ok(instance.clone());
            }
        }

        #[cfg(feature = "tracing")]
        debug!(service = %self.token, lifetime = %lifetime, "building service");

        let instance = self.constructor.invoke(resolve)?;

        if lifetime.is_singleton() {
            *cached = Some(instance.clone());
        }

        Ok(instance)
    }

    /// Runs the disposer on the cached instance, if both exist, and clears
    /// the cache. Safe to call repeatedly.
    pub fn dispose(&self, ctx: &Context) {
        let instance = self.cached.lock().take();
        let disposer = self.settings.read().disposer.clone();

        if let (Some(instance), Some(disposer)) = (instance, disposer) {
            #[cfg(feature = "tracing")]
            debug!(service = %self.token, "disposing service");

            disposer(ctx, &instance);
        }
    }

    #[cfg(feature = "cycle-detection")]
    fn key(&self) -> usize {
        self as *const Self as usize
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settings = self.settings.read();
        f.debug_struct("ServiceDescriptor")
            .field("name", &settings.name)
            .field("type", &self.token)
            .field("lifetime", &settings.lifetime)
            .field("dependencies", &self.constructor.parameters())
            .field("has_disposer", &settings.disposer.is_some())
            .finish()
    }
}

/// Fluent configuration handle returned by registration.
///
/// ```
/// use wirebox::{Container, Lifetime};
///
/// struct Clock;
///
/// let container = Container::new();
/// let handle = container.add_service(|| Clock).set_name("clock").as_singleton();
/// assert_eq!(handle.name(), "clock");
/// assert!(handle.lifetime() == Lifetime::Singleton);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ServiceHandle {
    descriptor: Shared<ServiceDescriptor>,
}

impl ServiceHandle {
    pub(crate) fn new(descriptor: Shared<ServiceDescriptor>) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &Shared<ServiceDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> String {
        self.descriptor.name()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.descriptor.lifetime()
    }

    pub fn token(&self) -> TypeToken {
        self.descriptor.token()
    }

    pub fn dependencies(&self) -> &[TypeToken] {
        self.descriptor.dependencies()
    }

    /// Overrides the lookup name; empty strings are ignored.
    pub fn set_name(self, name: impl AsRef<str>) -> Self {
        self.descriptor.set_name(name.as_ref());
        self
    }

    /// Sets the callback `Container::clean` runs on the cached instance.
    pub fn set_dispose<F>(self, disposer: F) -> Self
    where
        F: Fn(&Context, &Instance) + Send + Sync + 'static,
    {
        self.descriptor.set_disposer(Shared::new(disposer));
        self
    }

    /// Like [`set_dispose`](Self::set_dispose), with the instance downcast to `T`.
    /// The callback is skipped if the instance is not a `T`.
    pub fn set_typed_dispose<T, F>(self, disposer: F) -> Self
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&Context, &T) + Send + Sync + 'static,
    {
        self.set_dispose(move |ctx, instance| {
            if let Some(value) = instance.downcast_ref::<T>() {
                disposer(ctx, value);
            }
        })
    }

    pub fn as_singleton(self) -> Self {
        self.descriptor.set_lifetime(Lifetime::Singleton);
        self
    }

    pub fn as_transient(self) -> Self {
        self.descriptor.set_lifetime(Lifetime::Transient);
        self
    }

    pub fn as_scoped(self) -> Self {
        self.descriptor.set_lifetime(Lifetime::Scoped);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::{IntoConstructor, IntoFallibleConstructor};
    use crate::error::ErrorKind;
    use crate::runtime::instance_of;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestService {
        dep: Option<Arc<TestDependency>>,
    }

    struct TestDependency;

    fn descriptor<P, C: IntoConstructor<P>>(ctor: C) -> ServiceDescriptor {
        ServiceDescriptor::new(ctor.into_constructor()).unwrap()
    }

    fn fallible<P, C: IntoFallibleConstructor<P>>(ctor: C) -> ServiceDescriptor {
        ServiceDescriptor::new(ctor.into_constructor()).unwrap()
    }

    fn no_dependencies(token: &TypeToken) -> Result<Instance, Error> {
        Err(Error::dependency_not_resolved(token.name()))
    }

    #[test]
    fn defaults_from_constructor() {
        let d = descriptor(|| Arc::new(TestService { dep: None }));
        assert_eq!(d.name(), std::any::type_name::<TestService>());
        assert!(d.lifetime() == Lifetime::Transient);
        assert_eq!(d.token(), TypeToken::of::<Arc<TestService>>());
        assert!(!d.is_cached());
    }

    #[test]
    fn rejects_invalid_shapes() {
        let unit = ServiceDescriptor::new(IntoConstructor::into_constructor(|| ()));
        assert!(matches!(unit, Err(e) if e.kind == ErrorKind::InvalidConstructor));

        let error_first = ServiceDescriptor::new(IntoConstructor::into_constructor(|| {
            std::io::Error::other("boom")
        }));
        assert!(matches!(error_first, Err(e) if e.kind == ErrorKind::InvalidConstructor));
    }

    #[test]
    fn set_name_ignores_empty() {
        let d = descriptor(|| TestDependency);
        d.set_name("MyService");
        assert_eq!(d.name(), "MyService");
        d.set_name("");
        assert_eq!(d.name(), "MyService");
    }

    #[test]
    fn transient_builds_are_distinct() {
        let d = descriptor(|| Arc::new(TestDependency));
        let first = d.build(&mut no_dependencies).unwrap();
        let second = d.build(&mut no_dependencies).unwrap();
        assert!(!Shared::ptr_eq(&first, &second));
        assert!(!d.is_cached());
    }

    #[test]
    fn singleton_builds_are_shared() {
        let d = descriptor(|| Arc::new(TestDependency));
        d.set_lifetime(Lifetime::Singleton);

        let first = d.build(&mut no_dependencies).unwrap();
        let second = d.build(&mut no_dependencies).unwrap();
        assert!(Shared::ptr_eq(&first, &second));
        assert!(d.is_cached());
    }

    #[test]
    fn cached_singleton_skips_resolver_and_constructor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let d = descriptor(move |dep: Arc<TestDependency>| {
            counter.fetch_add(1, Ordering::SeqCst);
            TestService { dep: Some(dep) }
        });
        d.set_lifetime(Lifetime::Singleton);

        let mut resolved = 0;
        let mut resolve = |_: &TypeToken| {
            resolved += 1;
            Ok::<_, Error>(instance_of(Arc::new(TestDependency)))
        };
        d.build(&mut resolve).unwrap();
        d.build(&mut resolve).unwrap();

        assert_eq!(resolved, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn changing_lifetime_keeps_cached_instance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let d = descriptor(|| Arc::new(TestDependency));
        d.set_lifetime(Lifetime::Singleton);
        d.set_disposer(Shared::new(move |_: &Context, _: &Instance| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        d.build(&mut no_dependencies).unwrap();

        d.set_lifetime(Lifetime::Transient);
        assert!(d.is_cached());

        d.dispose(&Context::background());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!d.is_cached());
    }

    #[test]
    fn constructor_error_is_not_cached() {
        let d = fallible(|| Err::<TestService, _>("boom"));
        d.set_lifetime(Lifetime::Singleton);

        let result = d.build(&mut no_dependencies);
        assert!(matches!(result, Err(e) if e.kind == ErrorKind::ConstructorFailed));
        assert!(!d.is_cached());
    }

    #[test]
    fn injects_resolved_dependency() {
        let dep = Arc::new(TestDependency);
        let stored = instance_of(dep.clone());
        let d = descriptor(|dep: Arc<TestDependency>| TestService { dep: Some(dep) });

        let built = d
            .build(&mut |token: &TypeToken| {
                assert_eq!(*token, TypeToken::of::<Arc<TestDependency>>());
                Ok(stored.clone())
            })
            .unwrap();

        let service = built.downcast_ref::<TestService>().unwrap();
        assert!(service.dep.as_ref().is_some_and(|d| Arc::ptr_eq(d, &dep)));
    }

    #[test]
    fn missing_dependency_fails_build() {
        let d = descriptor(|dep: Arc<TestDependency>| TestService { dep: Some(dep) });
        let result = d.build(&mut no_dependencies);
        assert!(matches!(result, Err(e) if e.kind == ErrorKind::DependencyNotResolved));
    }

    #[test]
    fn dispose_calls_disposer_once_and_clears() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let d = descriptor(|| String::from("some service"));
        d.set_lifetime(Lifetime::Singleton);
        d.set_disposer(Shared::new(move |_: &Context, instance: &Instance| {
            assert_eq!(
                instance.downcast_ref::<String>().map(String::as_str),
                Some("some service")
            );
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        d.build(&mut no_dependencies).unwrap();
        d.dispose(&Context::background());
        d.dispose(&Context::background());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!d.is_cached());
    }

    #[test]
    fn dispose_without_disposer_clears_cache() {
        let d = descriptor(|| TestDependency);
        d.set_lifetime(Lifetime::Singleton);
        d.build(&mut no_dependencies).unwrap();

        d.dispose(&Context::background());
        assert!(!d.is_cached());
    }

    #[test]
    fn dispose_receives_context() {
        let ctx = Context::background();
        let expected = ctx.clone();
        let seen = Arc::new(AtomicUsize::new(0));
        let flag = seen.clone();
        let d = descriptor(|| TestDependency);
        d.set_lifetime(Lifetime::Singleton);
        d.set_disposer(Shared::new(move |c: &Context, _: &Instance| {
            assert!(c.ptr_eq(&expected));
            flag.fetch_add(1, Ordering::SeqCst);
        }));

        d.build(&mut no_dependencies).unwrap();
        d.dispose(&ctx);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_singleton_builds_construct_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let d = descriptor(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Arc::new(TestDependency)
        });
        d.set_lifetime(Lifetime::Singleton);

        let built: Vec<Instance> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| d.build(&mut no_dependencies).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(built.windows(2).all(|w| Shared::ptr_eq(&w[0], &w[1])));
    }

    #[cfg(feature = "cycle-detection")]
    #[test]
    fn self_reference_is_reported_not_deadlocked() {
        let d = Arc::new(descriptor(|dep: Arc<TestDependency>| TestService { dep: Some(dep) }));
        let inner = d.clone();

        let result = d.build(&mut |_: &TypeToken| inner.build(&mut no_dependencies));
        assert!(matches!(
            result,
            Err(e) if e.kind == ErrorKind::CircularDependency
        ));
    }
}
