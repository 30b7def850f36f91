//! Path-qualified configuration entries and the ordered store that holds them.
//!
//! Every entry is keyed by the pair `(path, key)` where `path` is a task's
//! colon-joined position in the tree (`"run:analysis:pairs"`) and `key` is the
//! parameter name. Re-adding an existing pair overwrites the value in place;
//! otherwise insertion order is preserved so a merged store replays its
//! sources deterministically.

use serde::{Deserialize, Serialize};

/// A typed scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigValue {
    /// Boolean flag.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Double-precision float.
    Double(f64),
    /// String value.
    Str(String),
}

impl ConfigValue {
    /// Human-readable type name, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Long(_) => "long",
            ConfigValue::Double(_) => "double",
            ConfigValue::Str(_) => "string",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Long(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Double(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

/// One stored parameter: a value bound to a `(path, key)` identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Colon-joined task path the entry belongs to.
    pub path: String,
    /// Parameter name.
    pub key: String,
    /// Stored value.
    pub value: ConfigValue,
}

/// An ordered collection of path-qualified configuration entries.
///
/// Lookup is by exact `(path, key)` pair; the prefix-walking override search
/// lives in [`crate::resolve`]. Stores at this scale hold tens of entries, so
/// a plain ordered `Vec` with linear lookup beats a map on both simplicity
/// and iteration-order guarantees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigStore {
    entries: Vec<ConfigEntry>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value at `(path, key)`.
    pub fn set(&mut self, path: &str, key: &str, value: impl Into<ConfigValue>) {
        let value = value.into();
        if let Some(e) = self
            .entries
            .iter_mut()
            .find(|e| e.path == path && e.key == key)
        {
            e.value = value;
        } else {
            self.entries.push(ConfigEntry {
                path: path.to_string(),
                key: key.to_string(),
                value,
            });
        }
    }

    /// Insert a value at `(path, key)` only when the pair is absent.
    ///
    /// Used for built-in defaults: caller-supplied overrides that were merged
    /// in ahead of time must survive.
    pub fn set_default(&mut self, path: &str, key: &str, value: impl Into<ConfigValue>) {
        if self.get(path, key).is_none() {
            self.set(path, key, value);
        }
    }

    /// Exact lookup of `(path, key)`.
    pub fn get(&self, path: &str, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|e| e.path == path && e.key == key)
            .map(|e| &e.value)
    }

    /// Merge every entry of `other` into `self`, overwriting on collision.
    ///
    /// Entries are cloned, never aliased: mutating the source store after a
    /// merge does not affect the destination.
    pub fn merge(&mut self, other: &ConfigStore) {
        for e in &other.entries {
            self.set(&e.path, &e.key, e.value.clone());
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.iter()
    }
}
