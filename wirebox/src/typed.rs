//! Typed lookups on top of the name-based API.
//!
//! The service name is derived from the requested type the same way a
//! registration derives its default name, so `get::<Arc<Db>>` finds a
//! service built by `|| Arc::new(Db)` without a custom name.
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::{typed, Container};
//!
//! struct Db;
//!
//! let container = Container::new();
//! container.add_service(|| Arc::new(Db)).as_singleton();
//! container.add_service(|| 8080u16).set_name("port");
//!
//! let db: Arc<Db> = typed::get(&container);
//! assert!(Arc::ptr_eq(&db, &typed::get::<Arc<Db>>(&container)));
//! assert_eq!(typed::get_by_name::<u16>(&container, "port"), 8080);
//! ```

use std::any::Any;

use crate::container::Container;
use crate::error::Error;
use crate::provider::ServiceProvider;
use crate::runtime::Instance;
use crate::token::TypeToken;

/// Resolves the service named after `T`. Panics on any failure.
pub fn get<T>(provider: &(impl ServiceProvider + ?Sized)) -> T
where
    T: Clone + Any + Send + Sync,
{
    try_get(provider).unwrap_or_else(|err| panic!("{}", err))
}

pub fn try_get<T>(provider: &(impl ServiceProvider + ?Sized)) -> Result<T, Error>
where
    T: Clone + Any + Send + Sync,
{
    let name = TypeToken::of::<T>().default_service_name();
    try_get_by_name(provider, &name)
}

/// Resolves the service registered under `name` as a `T`.
///
/// Panics if the lookup fails or the service does not produce a `T`.
pub fn get_by_name<T>(provider: &(impl ServiceProvider + ?Sized), name: &str) -> T
where
    T: Clone + Any + Send + Sync,
{
    try_get_by_name(provider, name).unwrap_or_else(|err| panic!("{}", err))
}

pub fn try_get_by_name<T>(provider: &(impl ServiceProvider + ?Sized), name: &str) -> Result<T, Error>
where
    T: Clone + Any + Send + Sync,
{
    let instance = provider.try_get_service(name)?;
    downcast(&instance, name)
}

/// Builds every service producing `T`, in registration order.
pub fn get_all<T>(container: &Container) -> Vec<T>
where
    T: Clone + Any + Send + Sync,
{
    try_get_all(container).unwrap_or_else(|err| panic!("{}", err))
}

pub fn try_get_all<T>(container: &Container) -> Result<Vec<T>, Error>
where
    T: Clone + Any + Send + Sync,
{
    let token = TypeToken::of::<T>();
    container
        .try_get_services(&token)?
        .iter()
        .map(|instance| downcast(instance, token.name()))
        .collect()
}

fn downcast<T>(instance: &Instance, name: &str) -> Result<T, Error>
where
    T: Clone + Any + Send + Sync,
{
    instance
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| Error::type_mismatch(std::any::type_name::<T>(), name))
}
