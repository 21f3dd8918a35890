//! # wirebox
//!
//! A constructor-driven service container.
//!
//! Services are registered as plain closures; the parameter types of the
//! closure are the service's dependencies and its return type is what it
//! provides. Each service has a name (the produced type's path by default)
//! and a [`Lifetime`]:
//!
//! - **Singleton**: built once, shared by everyone until [`Container::clean`].
//! - **Transient**: built on every request.
//! - **Scoped**: built once per [`Scope`]; outside a scope, like transient.
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::{typed, Container, Context};
//!
//! struct Config { greeting: String }
//! struct Greeter { config: Arc<Config> }
//!
//! #[derive(Clone)]
//! struct RequestId(u32);
//!
//! let container = Container::new();
//! container
//!     .add_service(|| Arc::new(Config { greeting: "hello".into() }))
//!     .as_singleton();
//! container
//!     .add_service(|config: Arc<Config>| Arc::new(Greeter { config }))
//!     .set_name("greeter")
//!     .as_scoped();
//!
//! let scope = container.create_scope_with_context(
//!     Context::background().with_value(RequestId(1)),
//! );
//! let greeter: Arc<Greeter> = typed::get_by_name(&scope, "greeter");
//! assert_eq!(greeter.config.greeting, "hello");
//!
//! container.clean(&Context::background());
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): registration, builds and disposal are logged
//!   through [`tracing`](https://docs.rs/tracing).
//! - `debug` (default): `Debug` implementations and the `std::error::Error`
//!   impl on [`Error`].
//! - `cycle-detection` (default): a build that needs itself fails with
//!   [`ErrorKind::CircularDependency`] instead of deadlocking.

pub mod constructor;
pub mod container;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod lifetime;
pub mod provider;
#[cfg(feature = "cycle-detection")]
pub mod resolve_guard;
pub mod runtime;
pub mod scope;
mod signature;
pub mod token;
pub mod typed;

pub use constructor::*;
pub use container::*;
pub use context::*;
pub use descriptor::*;
pub use error::*;
pub use lifetime::*;
pub use provider::*;
#[cfg(feature = "cycle-detection")]
pub use resolve_guard::*;
pub use runtime::*;
pub use scope::*;
pub use token::*;
