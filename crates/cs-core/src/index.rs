//! Flat-index arithmetic for the (event-filter × particle-filter) group matrix.
//!
//! Single-observable groups occupy one slot per `(ef, pf)` combination; pair
//! groups occupy one per `(ef, pf1, pf2)`. The registry stores each set as a
//! flat array, so all addressing goes through these helpers.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Identifies one of the four parallel group sets of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupSet {
    /// Directly filled single-observable groups.
    BaseSingle,
    /// Directly filled pair-observable groups.
    BasePair,
    /// Groups computed from base singles at finalize time.
    DerivedSingle,
    /// Groups computed from base pairs at finalize time.
    DerivedPair,
}

impl GroupSet {
    /// All sets, in registry storage order.
    pub const ALL: [GroupSet; 4] = [
        GroupSet::BaseSingle,
        GroupSet::BasePair,
        GroupSet::DerivedSingle,
        GroupSet::DerivedPair,
    ];

    /// Stable string id, used as a persistence key.
    pub fn id(self) -> &'static str {
        match self {
            GroupSet::BaseSingle => "base_single",
            GroupSet::BasePair => "base_pair",
            GroupSet::DerivedSingle => "derived_single",
            GroupSet::DerivedPair => "derived_pair",
        }
    }

    /// True for the two pair-observable sets.
    pub fn is_pair(self) -> bool {
        matches!(self, GroupSet::BasePair | GroupSet::DerivedPair)
    }
}

/// Flat slot for a single-observable group.
pub fn single_index(ef: usize, pf: usize, n_particle_filters: usize) -> usize {
    ef * n_particle_filters + pf
}

/// Flat slot for a pair-observable group.
pub fn pair_index(ef: usize, pf1: usize, pf2: usize, n_particle_filters: usize) -> usize {
    (ef * n_particle_filters + pf1) * n_particle_filters + pf2
}

/// Contiguous single-group slot range belonging to one event filter.
pub fn single_block(ef: usize, n_particle_filters: usize) -> Range<usize> {
    ef * n_particle_filters..(ef + 1) * n_particle_filters
}

/// Contiguous pair-group slot range belonging to one event filter.
pub fn pair_block(ef: usize, n_particle_filters: usize) -> Range<usize> {
    let p2 = n_particle_filters * n_particle_filters;
    ef * p2..(ef + 1) * p2
}
