//! Thread-local stack guard for circular dependency detection.
//!
//! Every descriptor build pushes the descriptor onto a per-thread stack for
//! the duration of the build. Meeting a descriptor that is already on the
//! stack means its construction depends on itself; the build fails with
//! [`ErrorKind::CircularDependency`](crate::ErrorKind::CircularDependency)
//! instead of recursing forever or deadlocking on the descriptor's own
//! build lock.
//!
//! Builds never hop threads, so a thread-local stack sees whole chains.
//!
//! # Example
//! ```
//! use wirebox::{ErrorKind, ResolveGuard};
//!
//! let _a = ResolveGuard::push(1, "A").unwrap();
//! let _b = ResolveGuard::push(2, "B").unwrap();
//! let err = ResolveGuard::push(1, "A").unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::CircularDependency));
//! assert!(err.message.contains("A -> B -> A"));
//! ```

use std::cell::RefCell;

use crate::Error;

thread_local! {
    // (descriptor key, display name) of every build in progress on this thread.
    static RESOLVE_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops its entry from the thread-local stack on drop.
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ResolveGuard {
    pub key: usize,
}

impl ResolveGuard {
    /// Try to push a descriptor onto the thread-local stack.
    ///
    /// Returns `Err(Error::circular_dependency(..))` if `key` is already on the
    /// stack. Otherwise, returns a guard that will pop it on drop.
    pub fn push(key: usize, name: &str) -> Result<Self, Error> {
        RESOLVE_STACK.with(|stack| {
            let mut v = stack.borrow_mut();
            if let Some(start) = v.iter().position(|(k, _)| *k == key) {
                // Report only the loop itself, not the path that led into it.
                let mut chain: Vec<&str> = v[start..].iter().map(|(_, n)| n.as_str()).collect();
                chain.push(name);
                return Err(Error::circular_dependency(&chain));
            }
            v.push((key, name.to_string()));
            Ok(ResolveGuard { key })
        })
    }

    /// Number of builds in progress on the current thread.
    pub fn depth() -> usize {
        RESOLVE_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVE_STACK.with(|stack| {
            let mut v = stack.borrow_mut();
            v.pop();
        });
    }
}
