//! # cs-store
//!
//! File-backed persistence for CorrStat tasks: named scalar parameters
//! (acceptance counters) and opaque histogram-group blobs, kept in one
//! versioned JSON document per task.
//!
//! ## Example
//!
//! ```no_run
//! use cs_core::GroupSet;
//! use cs_store::{OpenMode, Store};
//!
//! let mut store = Store::open("pairAnalysis.json", OpenMode::CreateOrReplace).unwrap();
//! store.put_long("acceptedEvents_0", 12_345).unwrap();
//! store.flush().unwrap();
//!
//! let store = Store::open("pairAnalysis.json", OpenMode::Read).unwrap();
//! assert_eq!(store.get_long("acceptedEvents_0").unwrap(), 12_345);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod naming;
pub mod store;

pub use naming::{has_store_extension, store_target, STORE_EXTENSION};
pub use store::{OpenMode, ScalarValue, Store};
