//! Registration-time checks on what a constructor returns.
//!
//! The accepted shapes are "one value" (`Fn(..) -> T`, registered with
//! `add_service`) and "value or error" (`Fn(..) -> Result<T, E>`, registered
//! with `add_fallible_service`). Everything else is rejected before the
//! descriptor exists:
//!
//! | output                          | verdict                                    |
//! |---------------------------------|--------------------------------------------|
//! | `()`                            | no value                                   |
//! | `(A, B, C, ..)`                 | more than two return values                |
//! | `(Error, B)` / `(A, NotError)`  | not a `(value, error)` pair                 |
//! | `(A, Error)`                    | must be registered as fallible             |
//! | an error type                   | first return value is an error             |
//! | `Result<..>` via `add_service`  | must be registered as fallible             |
//!
//! Rust has no runtime "implements `Error`" query, so a type counts as an
//! error when its name looks like one: after stripping pointer wrappers and
//! `dyn`, the last path segment is `Error` or ends in `Error`.

use crate::error::Error;
use crate::token::{last_segment, pointee_name, split_generic, top_level_items, TypeToken};

/// Checks the output of a constructor registered through `add_service`.
pub(crate) fn validate_output(token: &TypeToken) -> Result<(), Error> {
    let name = token.name();

    if is_result(name) {
        return Err(Error::invalid_constructor(
            name,
            "returns a Result; register it with add_fallible_service",
        ));
    }

    if let Some(items) = tuple_items(name) {
        if items.len() == 2 && !is_error_like(items[0]) && is_error_like(items[1]) {
            return Err(Error::invalid_constructor(
                name,
                "returns (value, error) as a tuple; register it with add_fallible_service",
            ));
        }
    }

    validate_value(name)
}

/// Checks the `T` of a constructor registered through `add_fallible_service`.
pub(crate) fn validate_fallible_output(token: &TypeToken) -> Result<(), Error> {
    validate_value(token.name())
}

fn validate_value(name: &str) -> Result<(), Error> {
    if name == "()" {
        return Err(Error::invalid_constructor(name, "should return a value"));
    }

    if let Some(items) = tuple_items(name) {
        return match items.len() {
            0 | 1 => Ok(()),
            2 => Err(Error::invalid_constructor(
                name,
                "should return (value, error)",
            )),
            _ => Err(Error::invalid_constructor(
                name,
                "can not contain more than 2 return values",
            )),
        };
    }

    if is_error_like(name) {
        return Err(Error::invalid_constructor(
            name,
            "should return a non-error value",
        ));
    }

    Ok(())
}

fn tuple_items(name: &str) -> Option<Vec<&str>> {
    let inner = name.strip_prefix('(')?.strip_suffix(')')?;
    Some(top_level_items(inner))
}

fn is_result(name: &str) -> bool {
    matches!(split_generic(name), Some((path, _)) if last_segment(path) == "Result")
}

/// Whether a type name denotes an error value.
pub(crate) fn is_error_like(name: &str) -> bool {
    let name = pointee_name(name);
    let name = name.strip_prefix("dyn ").unwrap_or(name);
    let principal = name.split('+').next().unwrap_or(name).trim();
    let segment = last_segment(principal);
    segment.ends_with("Error")
}
