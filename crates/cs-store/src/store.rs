//! File-backed store for named scalars and opaque histogram-group blobs.
//!
//! The on-disk format is a single versioned JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "scalars": { "acceptedEvents_0": { "Long": 42 } },
//!   "groups": { "base_single": [ { …blob… } ] }
//! }
//! ```
//!
//! Group blobs are opaque to the store: they are serialized by the caller's
//! group type and kept as raw JSON values, so the store never needs to know
//! a group's shape (no runtime reflection, explicit schema only).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cs_core::{Error, GroupSet, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading; writes are rejected.
    Read,
    /// Start an empty document, replacing any existing file at flush time.
    CreateOrReplace,
    /// Start an empty document, but fail if the target file already exists.
    CreateIfAbsent,
}

/// A named scalar stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// 64-bit integer scalar.
    Long(i64),
    /// Double-precision scalar.
    Double(f64),
}

/// Current on-disk schema version.
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    version: u32,
    scalars: BTreeMap<String, ScalarValue>,
    groups: BTreeMap<String, Vec<serde_json::Value>>,
}

impl Document {
    fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            scalars: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }
}

/// An open store: a handle over one on-disk JSON document.
///
/// Mutations are buffered in memory; [`Store::flush`] writes the document
/// out. Read-mode stores reject every mutation with
/// [`Error::StoreUnavailable`].
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    mode: OpenMode,
    doc: Document,
}

impl Store {
    /// Open a store at `path` in the given mode.
    ///
    /// `Read` requires an existing, parseable document. `CreateIfAbsent`
    /// fails with [`Error::StoreUnavailable`] when the target already exists;
    /// `CreateOrReplace` never does.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = match mode {
            OpenMode::Read => {
                let text = fs::read_to_string(&path).map_err(|e| {
                    Error::StoreUnavailable(format!("cannot open '{}': {e}", path.display()))
                })?;
                let doc: Document = serde_json::from_str(&text).map_err(|e| {
                    Error::StoreUnavailable(format!("malformed store '{}': {e}", path.display()))
                })?;
                if doc.version != SCHEMA_VERSION {
                    return Err(Error::StoreUnavailable(format!(
                        "store '{}' has schema version {}, expected {}",
                        path.display(),
                        doc.version,
                        SCHEMA_VERSION
                    )));
                }
                doc
            }
            OpenMode::CreateOrReplace => Document::empty(),
            OpenMode::CreateIfAbsent => {
                if path.exists() {
                    return Err(Error::StoreUnavailable(format!(
                        "'{}' already exists (force-rewrite disabled)",
                        path.display()
                    )));
                }
                Document::empty()
            }
        };
        Ok(Self { path, mode, doc })
    }

    /// Path this store reads from / writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writable(&self) -> Result<()> {
        if self.mode == OpenMode::Read {
            return Err(Error::StoreUnavailable(format!(
                "'{}' is open read-only",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Store a named 64-bit integer scalar.
    pub fn put_long(&mut self, name: &str, value: i64) -> Result<()> {
        self.writable()?;
        self.doc
            .scalars
            .insert(name.to_string(), ScalarValue::Long(value));
        Ok(())
    }

    /// Store a named double scalar.
    pub fn put_double(&mut self, name: &str, value: f64) -> Result<()> {
        self.writable()?;
        self.doc
            .scalars
            .insert(name.to_string(), ScalarValue::Double(value));
        Ok(())
    }

    /// Read a named 64-bit integer scalar.
    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.doc.scalars.get(name) {
            Some(ScalarValue::Long(v)) => Ok(*v),
            Some(ScalarValue::Double(_)) => Err(Error::StoreUnavailable(format!(
                "scalar '{name}' is a double, expected a long"
            ))),
            None => Err(Error::ScalarNotFound(name.to_string())),
        }
    }

    /// Read a named double scalar.
    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.doc.scalars.get(name) {
            Some(ScalarValue::Double(v)) => Ok(*v),
            Some(ScalarValue::Long(_)) => Err(Error::StoreUnavailable(format!(
                "scalar '{name}' is a long, expected a double"
            ))),
            None => Err(Error::ScalarNotFound(name.to_string())),
        }
    }

    /// Store the groups of one set, replacing any previously stored blobs
    /// for that set.
    pub fn put_groups<G: Serialize>(&mut self, set: GroupSet, groups: &[G]) -> Result<()> {
        self.writable()?;
        let blobs = groups
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.doc.groups.insert(set.id().to_string(), blobs);
        Ok(())
    }

    /// Read back `count` groups of one set.
    ///
    /// Fails with [`Error::GroupCountMismatch`] when fewer blobs are stored
    /// than requested; extra stored blobs beyond `count` are ignored.
    pub fn get_groups<G: DeserializeOwned>(&self, set: GroupSet, count: usize) -> Result<Vec<G>> {
        let blobs = self.doc.groups.get(set.id()).map(Vec::as_slice).unwrap_or(&[]);
        if blobs.len() < count {
            return Err(Error::GroupCountMismatch {
                set: set.id(),
                have: blobs.len(),
                want: count,
            });
        }
        blobs[..count]
            .iter()
            .map(|b| serde_json::from_value(b.clone()).map_err(Error::from))
            .collect()
    }

    /// Number of blobs stored for one set.
    pub fn group_count(&self, set: GroupSet) -> usize {
        self.doc.groups.get(set.id()).map(Vec::len).unwrap_or(0)
    }

    /// Write the document to disk, creating parent directories as needed.
    pub fn flush(&self) -> Result<()> {
        self.writable()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.doc)?;
        fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), "store flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_mode_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");

        let mut w = Store::open(&path, OpenMode::CreateOrReplace).unwrap();
        w.put_long("n", 7).unwrap();
        w.flush().unwrap();

        let mut r = Store::open(&path, OpenMode::Read).unwrap();
        assert_eq!(r.get_long("n").unwrap(), 7);
        assert!(matches!(
            r.put_long("n", 8),
            Err(Error::StoreUnavailable(_))
        ));
    }

    #[test]
    fn create_if_absent_fails_on_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        Store::open(&path, OpenMode::CreateOrReplace)
            .unwrap()
            .flush()
            .unwrap();

        let err = Store::open(&path, OpenMode::CreateIfAbsent).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        // Force-rewrite path still succeeds.
        assert!(Store::open(&path, OpenMode::CreateOrReplace).is_ok());
    }

    #[test]
    fn missing_scalar_is_typed() {
        let dir = tempfile::tempdir().unwrap();
        let s = Store::open(dir.path().join("s.json"), OpenMode::CreateOrReplace).unwrap();
        assert!(matches!(
            s.get_long("absent"),
            Err(Error::ScalarNotFound(_))
        ));
    }

    #[test]
    fn scalar_type_confusion_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Store::open(dir.path().join("s.json"), OpenMode::CreateOrReplace).unwrap();
        s.put_double("x", 1.5).unwrap();
        assert!(s.get_long("x").is_err());
        assert_eq!(s.get_double("x").unwrap(), 1.5);
    }

    #[test]
    fn group_count_mismatch() {
        #[derive(Debug, Serialize, serde::Deserialize)]
        struct Blob {
            v: f64,
        }

        let dir = tempfile::tempdir().unwrap();
        let mut s = Store::open(dir.path().join("s.json"), OpenMode::CreateOrReplace).unwrap();
        s.put_groups(GroupSet::BaseSingle, &[Blob { v: 1.0 }, Blob { v: 2.0 }])
            .unwrap();

        let err = s.get_groups::<Blob>(GroupSet::BaseSingle, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::GroupCountMismatch { have: 2, want: 3, .. }
        ));
        let two: Vec<Blob> = s.get_groups(GroupSet::BaseSingle, 2).unwrap();
        assert_eq!(two.len(), 2);
    }

    #[test]
    fn unknown_set_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = Store::open(dir.path().join("s.json"), OpenMode::CreateOrReplace).unwrap();
        assert_eq!(s.group_count(GroupSet::DerivedPair), 0);
        let none: Vec<serde_json::Value> = s.get_groups(GroupSet::DerivedPair, 0).unwrap();
        assert!(none.is_empty());
    }
}
