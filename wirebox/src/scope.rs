//! Per-unit-of-work resolution.
//!
//! A [`Scope`] is bound to one [`Container`] and one [`Context`]. Services
//! registered as [`Lifetime::Scoped`](crate::Lifetime::Scoped) are built at
//! most once per scope and cached by produced type; every other lifetime is
//! delegated to the container, so singletons stay process-wide and
//! transients stay fresh.
//!
//! While a scoped service is built, its parameters are looked up in order:
//!
//! 1. a [`Context`] parameter receives the scope's context;
//! 2. a type already cached in this scope is reused;
//! 3. a type produced by a scoped service is built and cached here;
//! 4. anything else is resolved by the container.
//!
//! The scope holds its cache lock for the whole of [`Scope::get_service`],
//! so constructors must not call back into the same scope.

use std::collections::HashMap;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::container::Container;
use crate::context::Context;
use crate::descriptor::ServiceDescriptor;
use crate::error::Error;
use crate::runtime::{instance_of, Instance};
use crate::token::TypeToken;

type Instances = HashMap<TypeToken, Instance>;

pub struct Scope {
    container: Container,
    context: Context,
    instances: Mutex<Instances>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("context", &self.context)
            .field("cached", &self.instances.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Scope {
    pub(crate) fn new(container: Container, context: Context) -> Self {
        Self {
            container,
            context,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// The context this scope was created with.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolves the first service registered under `name`.
    ///
    /// Panics when no service has that name or when its build fails.
    pub fn get_service(&self, name: &str) -> Instance {
        self.try_get_service(name)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_get_service(&self, name: &str) -> Result<Instance, Error> {
        let descriptor = self.container.get_service_info(name)?;

        if !descriptor.lifetime().is_scoped() {
            return self.container.build(&descriptor);
        }

        let mut instances = self.instances.lock();
        self.resolve_scoped(&mut instances, &descriptor)
    }

    /// Number of instances cached in this scope.
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }

    fn resolve_scoped(
        &self,
        instances: &mut Instances,
        descriptor: &ServiceDescriptor,
    ) -> Result<Instance, Error> {
        let token = descriptor.token();
        if let Some(instance) = instances.get(&token) {
            #[cfg(feature = "tracing")]
            trace!(service = %token, "scope cache hit");

            return Ok(instance.clone());
        }

        #[cfg(feature = "tracing")]
        debug!(service = %token, "building scoped service");

        let instance = descriptor
            .build(&mut |dependency: &TypeToken| self.resolve_dependency(instances, dependency))
            .map_err(|err| Error::build_failed(&descriptor.name(), err))?;

        instances.insert(token, instance.clone());
        Ok(instance)
    }

    fn resolve_dependency(
        &self,
        instances: &mut Instances,
        token: &TypeToken,
    ) -> Result<Instance, Error> {
        if *token == TypeToken::of::<Context>() {
            return Ok(instance_of(self.context.clone()));
        }

        if let Some(instance) = instances.get(token) {
            return Ok(instance.clone());
        }

        match self.container.find_by_type(token) {
            Some(descriptor) if descriptor.lifetime().is_scoped() => {
                self.resolve_scoped(instances, &descriptor)
            }
            _ => self.container.get_service_by_type(token),
        }
    }
}
