//! Recognized configuration keys.
//!
//! This is the flat key surface the task lifecycle honors. Keys are stored
//! path-qualified in a [`crate::ConfigStore`] and resolved with
//! most-specific-path-wins semantics, so any of them can be set once at the
//! root and overridden per subtree.

/// Whether the task consumes events at all.
pub const EVENTS_USED: &str = "EventsUsed";

/// Whether the task aggregates per-particle statistics (requires non-empty
/// particle-filter and event-filter lists at initialize time).
pub const USE_PARTICLES: &str = "UseParticles";

/// Whether the task reads event stream `n` (0..=3).
pub fn events_use_stream(n: usize) -> String {
    format!("EventsUseStream{n}")
}

/// Create fresh histogram groups at initialize.
pub const HISTOGRAMS_CREATE: &str = "HistogramsCreate";
/// Import prior histogram groups and acceptance counters at initialize.
pub const HISTOGRAMS_IMPORT: &str = "HistogramsImport";
/// Export histogram groups and acceptance counters at partial/finalize.
pub const HISTOGRAMS_EXPORT: &str = "HistogramsExport";
/// Normalize group contents by accepted-event counts before export.
pub const HISTOGRAMS_SCALE: &str = "HistogramsScale";
/// Zero counters and group contents after a successful partial export
/// (the per-stream save-then-reset workflow).
pub const HISTOGRAMS_RESET: &str = "HistogramsReset";
/// Release counter and group storage after a successful finalize export.
pub const HISTOGRAMS_CLEAR: &str = "HistogramsClear";
/// Replace an existing export file instead of failing when it exists.
pub const HISTOGRAMS_FORCE_REWRITE: &str = "HistogramsForceRewrite";

/// Directory to import prior state from (`"none"` = current directory).
pub const HISTOGRAMS_IMPORT_PATH: &str = "HistogramsImportPath";
/// File to import prior state from (`"none"` = the task's own name).
pub const HISTOGRAMS_IMPORT_FILE: &str = "HistogramsImportFile";
/// Directory to export state to (`"none"` = current directory).
pub const HISTOGRAMS_EXPORT_PATH: &str = "HistogramsExportPath";
/// File to export state to (`"none"` = the task's own name).
pub const HISTOGRAMS_EXPORT_FILE: &str = "HistogramsExportFile";

/// Glob pattern `n` selecting input files for discovery glue (stored and
/// resolved here; the discovery code consuming it lives outside this core).
pub fn included_pattern(n: usize) -> String {
    format!("IncludedPattern{n}")
}

/// Glob pattern `n` excluding input files for discovery glue.
pub fn excluded_pattern(n: usize) -> String {
    format!("ExcludedPattern{n}")
}

/// Log-severity gate for the task's own diagnostics.
pub const SEVERITY: &str = "Severity";

/// Sentinel strings meaning "unset" for path/file keys.
pub fn is_unset(value: &str) -> bool {
    value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_keys() {
        assert_eq!(events_use_stream(2), "EventsUseStream2");
        assert_eq!(included_pattern(0), "IncludedPattern0");
        assert_eq!(excluded_pattern(7), "ExcludedPattern7");
    }

    #[test]
    fn unset_sentinels() {
        assert!(is_unset("none"));
        assert!(is_unset("NONE"));
        assert!(is_unset("Null"));
        assert!(!is_unset(""));
        assert!(!is_unset("output"));
    }
}
