//! # cs-core
//!
//! Core types for CorrStat: the configuration store and its
//! most-specific-path-wins resolution, flat-index arithmetic for the
//! (event-filter × particle-filter) group matrix, the error taxonomy, and the
//! contracts external collaborators (filters, aggregate groups) implement.
//!
//! ## Example
//!
//! ```
//! use cs_core::{resolve, ConfigStore};
//!
//! let mut store = ConfigStore::new();
//! store.set("run", "Severity", "Info");
//! store.set("run:pairs", "Severity", "Debug");
//!
//! // A task's own override shadows the ancestor default.
//! assert_eq!(resolve::resolve_str(&store, "run:pairs", "Severity").unwrap(), "Debug");
//! assert_eq!(resolve::resolve_str(&store, "run:singles", "Severity").unwrap(), "Info");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod index;
pub mod keys;
pub mod path;
pub mod resolve;
pub mod traits;

pub use config::{ConfigEntry, ConfigStore, ConfigValue};
pub use error::{Error, Result};
pub use index::{pair_block, pair_index, single_block, single_index, GroupSet};
pub use traits::{AggregateGroup, Filter, FilterSet};
