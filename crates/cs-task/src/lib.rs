//! # cs-task
//!
//! The CorrStat task tree: composable processing stages with lifecycle
//! phases (`configure` → `initialize` → `execute`* → `partial`/`finalize`,
//! plus `reset`/`clear`), per-task configuration resolved against ancestor
//! defaults, acceptance counters per selection filter, and a flat-indexed
//! registry of histogram groups that is scaled, exported and re-imported
//! across processing passes.
//!
//! ## Example
//!
//! ```
//! use cs_core::{ConfigStore, FilterSet, GroupSet};
//! use cs_task::{BinnedGroup, Task};
//!
//! let filters = FilterSet::new(["MB"], ["piPlus", "piMinus"]);
//!
//! let mut root: Task = Task::new("run");
//! root.add_sub_task(
//!     Task::new("pairs")
//!         .with_configuration({
//!             let mut c = ConfigStore::new();
//!             c.set("run:pairs", "UseParticles", true);
//!             c
//!         })
//!         .with_filters(filters),
//! )
//! .unwrap();
//!
//! root.configure().unwrap();
//! root.initialize(&|_set: GroupSet, name: &str| BinnedGroup::new(name, 20, 0.0, 2.0))
//!     .unwrap();
//!
//! // 1 event filter × 2 particle filters → 2 singles, 4 pairs.
//! let pairs = root.child("pairs").unwrap();
//! assert_eq!(pairs.registry().len(GroupSet::BaseSingle), 2);
//! assert_eq!(pairs.registry().len(GroupSet::BasePair), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acceptance;
pub mod group;
pub mod registry;
pub mod task;

pub use acceptance::AcceptanceCounters;
pub use group::BinnedGroup;
pub use registry::HistogramGroupRegistry;
pub use task::{GroupFactory, Task};
