//! Export/import target resolution.
//!
//! Directory and file keys use the sentinel `"none"`/`"null"` for "unset":
//! an unset directory means the current directory, an unset file name means
//! the task's own name. The store extension is appended exactly once.

use std::path::{Path, PathBuf};

use cs_core::keys;

/// Extension of persisted store files.
pub const STORE_EXTENSION: &str = "json";

/// Resolve the store target for a task.
///
/// `dir` and `file` are the raw configured values (possibly sentinels);
/// `task_name` is the fallback file stem.
pub fn store_target(dir: &str, file: &str, task_name: &str) -> PathBuf {
    let dir = if keys::is_unset(dir) {
        ""
    } else {
        // Collapse trailing separators, but never trim the filesystem root
        // itself away ("/" must stay "/", not become the current directory).
        let trimmed = dir.trim_end_matches(['/', '\\']);
        if trimmed.is_empty() && !dir.is_empty() {
            &dir[..1]
        } else {
            trimmed
        }
    };
    let file = if keys::is_unset(file) { task_name } else { file };

    let mut path = if dir.is_empty() {
        PathBuf::new()
    } else {
        PathBuf::from(dir)
    };
    path.push(file);
    if path.extension().and_then(|e| e.to_str()) != Some(STORE_EXTENSION) {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".");
        name.push(STORE_EXTENSION);
        path.set_file_name(name);
    }
    path
}

/// True when `path` ends with the store extension.
pub fn has_store_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(STORE_EXTENSION)
}
