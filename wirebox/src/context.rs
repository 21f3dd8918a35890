//! Ambient context handed to scoped constructors and disposers.
//!
//! A [`Context`] is an immutable, cheaply cloneable bag of typed values.
//! Deriving a context with [`Context::with_value`] never mutates the parent;
//! lookups walk from the newest value back to the root. The container never
//! interprets the values it carries.
//!
//! ```
//! use wirebox::Context;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct RequestId(u64);
//!
//! let ctx = Context::background().with_value(RequestId(7));
//! assert_eq!(ctx.value::<RequestId>(), Some(&RequestId(7)));
//! assert!(Context::background().value::<RequestId>().is_none());
//! ```

use std::any::{Any, TypeId};

use crate::runtime::Shared;

/// Opaque per-unit-of-work value; clones share identity.
#[derive(Clone)]
pub struct Context {
    inner: Shared<ContextInner>,
}

struct ContextInner {
    parent: Option<Context>,
    entry: Option<(TypeId, Box<dyn Any + Send + Sync>)>,
}

impl Context {
    /// An empty root context.
    pub fn background() -> Self {
        Self {
            inner: Shared::new(ContextInner {
                parent: None,
                entry: None,
            }),
        }
    }

    /// Derives a child context carrying `value`; it shadows any value of the
    /// same type further up the chain.
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            inner: Shared::new(ContextInner {
                parent: Some(self.clone()),
                entry: Some((TypeId::of::<T>(), Box::new(value))),
            }),
        }
    }

    pub fn value<T>(&self) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        let wanted = TypeId::of::<T>();
        let mut current = Some(self);

        while let Some(ctx) = current {
            if let Some((id, value)) = &ctx.inner.entry {
                if *id == wanted {
                    return value.downcast_ref::<T>();
                }
            }
            current = ctx.inner.parent.as_ref();
        }

        None
    }

    /// Whether both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Shared::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut depth = 0usize;
        let mut current = self.inner.parent.as_ref();
        while let Some(ctx) = current {
            depth += 1;
            current = ctx.inner.parent.as_ref();
        }
        f.debug_struct("Context").field("depth", &depth).finish()
    }
}
