//! Configuration resolution: most-specific-path-wins override search.
//!
//! Given a task path `"run:analysis:pairs"` and a key, the search tries
//! `("run:analysis:pairs", key)`, then `("run:analysis", key)`, then
//! `("run", key)`, returning the first hit. A child's own override therefore
//! always shadows any ancestor default, and the nearest ancestor shadows more
//! distant ones.
//!
//! Resolution is repeated per key per call. Store contents may be refreshed
//! between reset cycles, so nothing is cached here.

use crate::config::{ConfigStore, ConfigValue};
use crate::error::{Error, Result};
use crate::path;

/// Resolve `key` for a task at `task_path`, most specific prefix first.
///
/// Returns [`Error::ConfigKeyNotFound`] when no prefix holds the key. Never
/// substitutes a sentinel value for a miss.
pub fn resolve<'a>(store: &'a ConfigStore, task_path: &str, key: &str) -> Result<&'a ConfigValue> {
    for prefix in path::prefixes(task_path) {
        if let Some(v) = store.get(prefix, key) {
            return Ok(v);
        }
    }
    Err(Error::ConfigKeyNotFound {
        path: task_path.to_string(),
        key: key.to_string(),
    })
}

macro_rules! typed_resolver {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        $(#[$doc])*
        pub fn $name(store: &ConfigStore, task_path: &str, key: &str) -> Result<$ty> {
            match resolve(store, task_path, key)? {
                ConfigValue::$variant(v) => Ok(v.clone()),
                other => Err(Error::ConfigTypeMismatch {
                    path: task_path.to_string(),
                    key: key.to_string(),
                    found: other.type_name(),
                    expected: $expected,
                }),
            }
        }
    };
}

typed_resolver!(
    /// Resolve a boolean key.
    resolve_bool, Bool, bool, "bool"
);
typed_resolver!(
    /// Resolve a 32-bit integer key.
    resolve_int, Int, i32, "int"
);
typed_resolver!(
    /// Resolve a 64-bit integer key.
    resolve_long, Long, i64, "long"
);
typed_resolver!(
    /// Resolve a double key.
    resolve_double, Double, f64, "double"
);
typed_resolver!(
    /// Resolve a string key.
    resolve_str, Str, String, "string"
);

/// Resolve a boolean key, falling back to `default` only on a missing key.
/// Type mismatches still propagate.
pub fn resolve_bool_or(
    store: &ConfigStore,
    task_path: &str,
    key: &str,
    default: bool,
) -> Result<bool> {
    match resolve_bool(store, task_path, key) {
        Ok(v) => Ok(v),
        Err(Error::ConfigKeyNotFound { .. }) => Ok(default),
        Err(e) => Err(e),
    }
}

/// Resolve a string key, falling back to `default` only on a missing key.
pub fn resolve_str_or(
    store: &ConfigStore,
    task_path: &str,
    key: &str,
    default: &str,
) -> Result<String> {
    match resolve_str(store, task_path, key) {
        Ok(v) => Ok(v),
        Err(Error::ConfigKeyNotFound { .. }) => Ok(default.to_string()),
        Err(e) => Err(e),
    }
}
