//! Error types for the wirebox service container.
//!
//! This module defines a lightweight error model used across the container to
//! describe failures that can occur during registration, resolution and
//! scoped resolution.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category, a human-readable message and, for
//!   [`ErrorKind::BuildFailed`], the error of the layer below.
//!
//! Resolution errors are recoverable values while they travel through nested
//! builds; each layer wraps the cause with the name of the service it was
//! building. The panicking entry points (`get_service`, `get_services`) turn
//! the final value into a panic carrying the same text.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//! - `debug`: enables extra diagnostic formatting in `Display`.
//!
//! # Examples
//!
//! ```
//! use wirebox::error::{Error, ErrorKind};
//!
//! let missing = Error::dependency_not_resolved("app::Database");
//! let err = Error::build_failed("app::UserService", missing);
//! assert!(err.message.contains("app::UserService"));
//! assert!(matches!(err.root_cause().kind, ErrorKind::DependencyNotResolved));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// Error categories for the container.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum ErrorKind {
    /// No service registered under the requested name.
    ServiceNotFound,
    /// No service produces the requested parameter type.
    DependencyNotResolved,
    /// A service could not be built; `cause` holds the reason.
    BuildFailed,
    /// The constructor itself returned an error.
    ConstructorFailed,
    /// The constructor's return shape is not acceptable.
    InvalidConstructor,
    /// A value did not have the type it was requested as.
    TypeMismatch,
    /// Circular dependency detected in resolution chain.
    CircularDependency,
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    cause: Option<Box<Error>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is automatically logged.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
            cause: None,
        };

        #[cfg(feature = "tracing")]
        if matches!(
            kind,
            ErrorKind::ServiceNotFound | ErrorKind::DependencyNotResolved
        ) {
            warn!("{}", error);
        } else {
            error!("{}", error);
        }

        error
    }

    /// Name lookup found no registered service.
    pub fn service_not_found(name: &str) -> Self {
        Self::new(
            ErrorKind::ServiceNotFound,
            format!("container: could not find service, {}", name),
        )
    }

    /// Type lookup found no service producing the requested type.
    pub fn dependency_not_resolved(type_name: &str) -> Self {
        Self::new(
            ErrorKind::DependencyNotResolved,
            format!("container: failed to resolve {}", type_name),
        )
    }

    /// Wraps `cause` with the name of the service whose build it aborted.
    ///
    /// Not logged again: the innermost error already was.
    pub fn build_failed(name: &str, cause: Error) -> Self {
        Self {
            kind: ErrorKind::BuildFailed,
            message: format!("container: failed to build {}, {}", name, cause.message),
            cause: Some(Box::new(cause)),
        }
    }

    /// The constructor returned `Err`.
    pub fn constructor_failed(type_name: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ConstructorFailed,
            format!("service: {} constructor failed: {}", type_name, reason),
        )
    }

    /// Registration-time rejection of a constructor's return shape.
    pub fn invalid_constructor(type_name: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::InvalidConstructor,
            format!("service: {} {}", type_name, reason),
        )
    }

    /// Type mismatch during a checked downcast.
    pub fn type_mismatch(expected: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Type mismatch when resolving {}: expected {}", name, expected),
        )
    }

    /// Circular dependency detected in resolution chain.
    pub fn circular_dependency(dependency_chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::CircularDependency,
            format!(
                "Circular dependency detected: {}",
                dependency_chain.join(" -> ")
            ),
        )
    }

    /// The error of the layer below, if this one wraps another.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// The innermost error of a wrapped chain (`self` when nothing is wrapped).
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(feature = "debug")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
