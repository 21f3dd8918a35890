//! Type-erased constructors.
//!
//! Rust has no runtime reflection over function signatures, so the parameter
//! list is captured when a closure is registered: [`IntoConstructor`] and
//! [`IntoFallibleConstructor`] are implemented for every `Fn` of up to eight
//! parameters. The generated [`Constructor`] remembers the parameter
//! [`TypeToken`]s and, when invoked, asks a resolver for each one in
//! declaration order, downcasts the answer and calls the closure.
//!
//! Parameters are passed by value, cloned out of the resolved instance, so
//! they must be `Clone`. Passing `Arc<T>` keeps the reference identity of
//! the value the producing service built.

use std::any::Any;

use crate::error::Error;
use crate::runtime::{instance_of, BoxError, Instance};
use crate::token::TypeToken;

/// Answers "give me a value of this type" while a constructor runs.
pub type Resolver<'a> = dyn FnMut(&TypeToken) -> Result<Instance, Error> + 'a;

type Invoke = Box<dyn for<'r> Fn(&mut Resolver<'r>) -> Result<Instance, Error> + Send + Sync>;

/// A registered constructor with its signature recorded.
pub struct Constructor {
    output: TypeToken,
    parameters: Vec<TypeToken>,
    fallible: bool,
    invoke: Invoke,
}

impl Constructor {
    /// Type of the value the constructor produces.
    pub fn output(&self) -> TypeToken {
        self.output
    }

    /// Parameter types, in declaration order.
    pub fn parameters(&self) -> &[TypeToken] {
        &self.parameters
    }

    /// Whether the constructor returns `Result`.
    pub fn is_fallible(&self) -> bool {
        self.fallible
    }

    /// Resolves every parameter through `resolve` and runs the constructor.
    ///
    /// Stops at the first parameter that fails to resolve; later parameters
    /// are not requested and the constructor is not called.
    pub fn invoke(&self, resolve: &mut Resolver<'_>) -> Result<Instance, Error> {
        (self.invoke)(resolve)
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("output", &self.output)
            .field("parameters", &self.parameters)
            .field("fallible", &self.fallible)
            .finish()
    }
}

/// Closures usable with `Container::add_service`: `Fn(P1, .., Pn) -> T`.
pub trait IntoConstructor<Params> {
    fn into_constructor(self) -> Constructor;
}

/// Closures usable with `Container::add_fallible_service`:
/// `Fn(P1, .., Pn) -> Result<T, E>`.
pub trait IntoFallibleConstructor<Params> {
    fn into_constructor(self) -> Constructor;
}

fn resolve_parameter<P>(resolve: &mut Resolver<'_>) -> Result<P, Error>
where
    P: Clone + Any + Send + Sync,
{
    let token = TypeToken::of::<P>();
    let instance = resolve(&token)?;
    instance
        .downcast_ref::<P>()
        .cloned()
        .ok_or_else(|| Error::type_mismatch(token.name(), "constructor parameter"))
}

macro_rules! impl_constructor {
    ($($param:ident),*) => {
        impl<F, T, $($param,)*> IntoConstructor<($($param,)*)> for F
        where
            F: Fn($($param),*) -> T + Send + Sync + 'static,
            T: Any + Send + Sync,
            $($param: Clone + Any + Send + Sync,)*
        {
            #[allow(non_snake_case, unused_variables)]
            fn into_constructor(self) -> Constructor {
                Constructor {
                    output: TypeToken::of::<T>(),
                    parameters: vec![$(TypeToken::of::<$param>()),*],
                    fallible: false,
                    invoke: Box::new(move |resolve: &mut Resolver<'_>| {
                        $(let $param = resolve_parameter::<$param>(resolve)?;)*
                        Ok(instance_of((self)($($param),*)))
                    }),
                }
            }
        }

        impl<F, T, E, $($param,)*> IntoFallibleConstructor<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Result<T, E> + Send + Sync + 'static,
            T: Any + Send + Sync,
            E: Into<BoxError>,
            $($param: Clone + Any + Send + Sync,)*
        {
            #[allow(non_snake_case, unused_variables)]
            fn into_constructor(self) -> Constructor {
                let output = TypeToken::of::<T>();
                Constructor {
                    output,
                    parameters: vec![$(TypeToken::of::<$param>()),*],
                    fallible: true,
                    invoke: Box::new(move |resolve: &mut Resolver<'_>| {
                        $(let $param = resolve_parameter::<$param>(resolve)?;)*
                        match (self)($($param),*) {
                            Ok(value) => Ok(instance_of(value)),
                            Err(err) => {
                                let err: BoxError = err.into();
                                Err(Error::constructor_failed(output.name(), err))
                            }
                        }
                    }),
                }
            }
        }
    };
}

impl_constructor!();
impl_constructor!(P1);
impl_constructor!(P1, P2);
impl_constructor!(P1, P2, P3);
impl_constructor!(P1, P2, P3, P4);
impl_constructor!(P1, P2, P3, P4, P5);
impl_constructor!(P1, P2, P3, P4, P5, P6);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8);
