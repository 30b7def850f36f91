//! The histogram-group registry: four parallel flat sets of aggregate groups.
//!
//! Slot addressing uses the flat-index arithmetic from [`cs_core::index`]:
//! single-observable sets hold `E * P` slots, pair sets `E * P * P`, where
//! `E`/`P` are the event/particle filter counts fixed at configure time.

use cs_core::index::{pair_block, single_block};
use cs_core::{AggregateGroup, GroupSet};

/// Flat per-set storage of aggregate groups for one task.
#[derive(Debug, Clone)]
pub struct HistogramGroupRegistry<G> {
    n_event_filters: usize,
    n_particle_filters: usize,
    sets: [Vec<G>; 4],
}

fn set_slot(set: GroupSet) -> usize {
    match set {
        GroupSet::BaseSingle => 0,
        GroupSet::BasePair => 1,
        GroupSet::DerivedSingle => 2,
        GroupSet::DerivedPair => 3,
    }
}

impl<G: AggregateGroup> HistogramGroupRegistry<G> {
    /// Create an empty registry for the given filter counts.
    pub fn new(n_event_filters: usize, n_particle_filters: usize) -> Self {
        Self {
            n_event_filters,
            n_particle_filters,
            sets: Default::default(),
        }
    }

    /// Event-filter count the flat indices are computed against.
    pub fn n_event_filters(&self) -> usize {
        self.n_event_filters
    }

    /// Particle-filter count the flat indices are computed against.
    pub fn n_particle_filters(&self) -> usize {
        self.n_particle_filters
    }

    /// Append a group to the end of `set`.
    pub fn add_group(&mut self, set: GroupSet, group: G) {
        self.sets[set_slot(set)].push(group);
    }

    /// Group at `flat` in `set`.
    pub fn group(&self, set: GroupSet, flat: usize) -> Option<&G> {
        self.sets[set_slot(set)].get(flat)
    }

    /// Mutable group at `flat` in `set`.
    pub fn group_mut(&mut self, set: GroupSet, flat: usize) -> Option<&mut G> {
        self.sets[set_slot(set)].get_mut(flat)
    }

    /// All groups of one set, in flat-index order.
    pub fn set_slice(&self, set: GroupSet) -> &[G] {
        &self.sets[set_slot(set)]
    }

    /// Number of groups currently held in `set`.
    pub fn len(&self, set: GroupSet) -> usize {
        self.sets[set_slot(set)].len()
    }

    /// True when every set is empty.
    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(Vec::is_empty)
    }

    /// Replace the entire contents of one set (import path).
    pub fn replace_set(&mut self, set: GroupSet, groups: Vec<G>) {
        self.sets[set_slot(set)] = groups;
    }

    /// Scale every slot belonging to event filter `ef`, in every non-empty
    /// set, by `factor`. Slots beyond a set's populated length are skipped
    /// (derived sets may be partially filled or absent).
    pub fn scale_event_filter(&mut self, ef: usize, factor: f64) {
        for set in GroupSet::ALL {
            let block = if set.is_pair() {
                pair_block(ef, self.n_particle_filters)
            } else {
                single_block(ef, self.n_particle_filters)
            };
            let groups = &mut self.sets[set_slot(set)];
            for i in block {
                if let Some(g) = groups.get_mut(i) {
                    g.scale(factor);
                }
            }
        }
    }

    /// Zero the contents of every group in every set.
    pub fn reset_all(&mut self) {
        for set in &mut self.sets {
            for g in set.iter_mut() {
                g.reset();
            }
        }
    }

    /// Drop every group from every set. The registry stays usable and the
    /// filter counts are retained for a later re-initialize.
    pub fn clear(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }
}
