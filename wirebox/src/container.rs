//! The root service registry.
//!
//! A [`Container`] owns an insertion-ordered list of [`ServiceDescriptor`]s.
//! Lookups go by name ([`Container::get_service`]) or by produced type
//! ([`Container::get_services`]); constructor parameters are always
//! satisfied by type, recursively, against the same container.
//!
//! # Locking
//!
//! The descriptor list sits behind a reader/writer lock: registration and
//! the snapshot taken by [`clean`](Container::clean) lock it exclusively,
//! lookups share it. A
//! lookup clones the matching descriptors out and releases the list before
//! building, so a build never holds the list lock; builds of one descriptor
//! still serialize on that descriptor's own lock.
//!
//! # Errors
//!
//! The `get_*` entry points treat a missing or unbuildable service as a
//! programming error and panic. Every one of them has a `try_*` twin that
//! returns the same [`Error`] instead.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::Container;
//!
//! struct Database { url: String }
//! struct UserService { db: Arc<Database> }
//!
//! let container = Container::new();
//! container
//!     .add_service(|| Arc::new(Database { url: "postgres://localhost".into() }))
//!     .as_singleton();
//! container.add_service(|db: Arc<Database>| Arc::new(UserService { db }));
//!
//! let users = container.get_service(std::any::type_name::<UserService>());
//! let users = users.downcast_ref::<Arc<UserService>>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::constructor::{Constructor, IntoConstructor, IntoFallibleConstructor};
use crate::context::Context;
use crate::descriptor::{ServiceDescriptor, ServiceHandle};
use crate::error::Error;
use crate::runtime::{Instance, Shared, Store};
use crate::scope::Scope;
use crate::token::TypeToken;

/// Root registry of service descriptors. Clones share the same registry.
#[derive(Clone, Default)]
pub struct Container {
    inner: Shared<ContainerInner>,
}

#[derive(Default)]
struct ContainerInner {
    services: Store<Vec<Shared<ServiceDescriptor>>>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("services", &*self.inner.services.read())
            .finish()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor `Fn(P1, .., Pn) -> T`.
    ///
    /// Panics if the constructor's return shape is rejected; see
    /// [`try_add_service`](Self::try_add_service).
    pub fn add_service<P, C>(&self, constructor: C) -> ServiceHandle
    where
        C: IntoConstructor<P>,
    {
        self.try_add_service(constructor)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_add_service<P, C>(&self, constructor: C) -> Result<ServiceHandle, Error>
    where
        C: IntoConstructor<P>,
    {
        self.register(constructor.into_constructor())
    }

    /// Registers a constructor `Fn(P1, .., Pn) -> Result<T, E>`; an `Err`
    /// fails the build of that service.
    pub fn add_fallible_service<P, C>(&self, constructor: C) -> ServiceHandle
    where
        C: IntoFallibleConstructor<P>,
    {
        self.try_add_fallible_service(constructor)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_add_fallible_service<P, C>(&self, constructor: C) -> Result<ServiceHandle, Error>
    where
        C: IntoFallibleConstructor<P>,
    {
        self.register(constructor.into_constructor())
    }

    fn register(&self, constructor: Constructor) -> Result<ServiceHandle, Error> {
        let descriptor = Shared::new(ServiceDescriptor::new(constructor)?);

        #[cfg(feature = "tracing")]
        info!(
            service = %descriptor.name(),
            dependencies = descriptor.dependencies().len(),
            "registering service"
        );

        self.inner.services.write().push(descriptor.clone());
        Ok(ServiceHandle::new(descriptor))
    }

    /// Builds the first service registered under `name`.
    ///
    /// Panics when no service has that name or when its build fails.
    pub fn get_service(&self, name: &str) -> Instance {
        self.try_get_service(name)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_get_service(&self, name: &str) -> Result<Instance, Error> {
        let descriptor = self.get_service_info(name)?;
        self.build(&descriptor)
    }

    /// Builds every service producing `token`, in registration order.
    ///
    /// Returns an empty list when none match; panics if any build fails.
    pub fn get_services(&self, token: &TypeToken) -> Vec<Instance> {
        self.try_get_services(token)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_get_services(&self, token: &TypeToken) -> Result<Vec<Instance>, Error> {
        let matching: Vec<_> = self
            .inner
            .services
            .read()
            .iter()
            .filter(|d| d.token() == *token)
            .cloned()
            .collect();

        matching.iter().map(|d| self.build(d)).collect()
    }

    /// Whether a service is registered under `name`.
    pub fn has_service(&self, name: &str) -> bool {
        self.inner.services.read().iter().any(|d| d.has_name(name))
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.inner.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.services.read().is_empty()
    }

    /// Snapshot of the registered descriptors, in registration order.
    pub fn descriptors(&self) -> Vec<Shared<ServiceDescriptor>> {
        self.inner.services.read().clone()
    }

    /// Disposes every cached instance, in registration order.
    ///
    /// The container stays usable; singletons are rebuilt on next use.
    /// The registry is locked exclusively only to snapshot the descriptor
    /// list. Disposal waits for any in-flight build of the same descriptor.
    pub fn clean(&self, ctx: &Context) {
        let services = self.inner.services.write().clone();

        #[cfg(feature = "tracing")]
        info!(services = services.len(), "cleaning container");

        for descriptor in &services {
            descriptor.dispose(ctx);
        }
    }

    /// Creates a scope bound to an empty background context.
    pub fn create_scope(&self) -> Scope {
        self.create_scope_with_context(Context::background())
    }

    pub fn create_scope_with_context(&self, ctx: Context) -> Scope {
        #[cfg(feature = "tracing")]
        debug!("creating scope");

        Scope::new(self.clone(), ctx)
    }

    /// First descriptor registered under `name`.
    pub(crate) fn get_service_info(&self, name: &str) -> Result<Shared<ServiceDescriptor>, Error> {
        self.inner
            .services
            .read()
            .iter()
            .find(|d| d.has_name(name))
            .cloned()
            .ok_or_else(|| Error::service_not_found(name))
    }

    /// First descriptor producing `token`.
    pub(crate) fn find_by_type(&self, token: &TypeToken) -> Option<Shared<ServiceDescriptor>> {
        self.inner
            .services
            .read()
            .iter()
            .find(|d| d.token() == *token)
            .cloned()
    }

    /// Resolver used for constructor parameters: builds the first service
    /// producing `token`.
    pub(crate) fn get_service_by_type(&self, token: &TypeToken) -> Result<Instance, Error> {
        match self.find_by_type(token) {
            Some(descriptor) => self.build(&descriptor),
            None => Err(Error::dependency_not_resolved(token.name())),
        }
    }

    /// Builds `descriptor` against this container, naming it in any failure.
    pub(crate) fn build(&self, descriptor: &ServiceDescriptor) -> Result<Instance, Error> {
        descriptor
            .build(&mut |token: &TypeToken| self.get_service_by_type(token))
            .map_err(|err| Error::build_failed(&descriptor.name(), err))
    }
}
