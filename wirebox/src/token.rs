//! Runtime type descriptors.
//!
//! A [`TypeToken`] pairs a `TypeId` (identity, used for matching constructor
//! parameters against produced types) with the compiler's type name (used
//! for messages and for deriving default service names).

use core::fmt;
use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Identity of a Rust type, comparable at runtime.
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name a service producing this type gets when none is set explicitly.
    ///
    /// Pointer-like wrappers are stripped, so `Arc<app::Db>` and `app::Db`
    /// both default to `"app::Db"`.
    pub fn default_service_name(&self) -> String {
        pointee_name(self.name).to_string()
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeToken").field(&self.name).finish()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const POINTER_WRAPPERS: [&str; 3] = ["Arc", "Rc", "Box"];

/// Strips `&`, `&mut`, `Arc<..>`, `Rc<..>` and `Box<..>` until a non-pointer
/// type name remains.
pub(crate) fn pointee_name(mut name: &str) -> &str {
    loop {
        let trimmed = name.trim();
        if let Some(rest) = trimmed.strip_prefix('&') {
            name = rest.strip_prefix("mut ").unwrap_or(rest);
            continue;
        }
        match split_generic(trimmed) {
            Some((path, args)) if POINTER_WRAPPERS.contains(&last_segment(path)) => {
                // Allocator parameters are not part of the identity we want.
                name = top_level_items(args).first().copied().unwrap_or(args);
            }
            _ => return trimmed,
        }
    }
}

/// Splits `path<args>` into `("path", "args")`.
pub(crate) fn split_generic(name: &str) -> Option<(&str, &str)> {
    let open = name.find('<')?;
    let inner = name.strip_suffix('>')?;
    let path = &name[..open];
    if path.contains(['(', '[', ' ']) {
        return None;
    }
    Some((path, &inner[open + 1..]))
}

/// Last `::` segment of a path, ignoring generic arguments.
pub(crate) fn last_segment(path: &str) -> &str {
    let path = path.split('<').next().unwrap_or(path);
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// Splits a comma-separated list on commas not nested in `<>`, `()` or `[]`.
pub(crate) fn top_level_items(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in list.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = list[start..].trim();
    if !tail.is_empty() {
        items.push(tail);
    }
    items
}
