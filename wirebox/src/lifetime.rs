use core::fmt;

/// How long a built service value lives.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum Lifetime {
    /// Built once, cached on the descriptor, shared by the container and every scope.
    Singleton,
    /// Built on every resolution.
    #[default]
    Transient,
    /// Built once per [`Scope`](crate::Scope).
    Scoped,
}

impl Lifetime {
    pub fn is_singleton(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    pub fn is_scoped(self) -> bool {
        matches!(self, Lifetime::Scoped)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
        };
        f.write_str(name)
    }
}
