//! Runtime type definitions for shared ownership and interior mutability.
//!
//! Every container operation may be called from several threads at once, so
//! the aliases here always resolve to thread-safe types:
//!
//! - [`Shared<T>`]: `Arc<T>`
//! - [`Store<T>`]: `parking_lot::RwLock<T>` (no lock poisoning, so no `unwrap`)
//! - [`Instance`]: a type-erased, shareable service value
//!
//! # Examples
//!
//! ```
//! use wirebox::runtime::{Shared, Store};
//!
//! let store = Store::new(42);
//! let shared = Shared::new(store);
//! assert_eq!(*shared.read(), 42);
//! ```

use std::any::Any;

/// Shared ownership of data. Reference identity (`Shared::ptr_eq`) is how
/// singleton and scoped sharing is observed.
pub type Shared<T> = std::sync::Arc<T>;

/// Interior mutability guarded by a reader/writer lock.
pub type Store<T> = parking_lot::RwLock<T>;

/// A built service value with its concrete type erased.
///
/// The concrete value is whatever the constructor returned; use
/// `downcast_ref` (or the accessors in [`crate::typed`]) to get it back.
pub type Instance = Shared<dyn Any + Send + Sync>;

/// Error type accepted from fallible constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Wraps a concrete value into an [`Instance`].
pub(crate) fn instance_of<T>(value: T) -> Instance
where
    T: Any + Send + Sync,
{
    Shared::new(value)
}
