//! Contracts for external collaborators: selection filters and aggregate groups.

use std::sync::Arc;

/// A named selection predicate over candidates of type `C` (events or
/// particles, chosen by the analysis).
///
/// The orchestration core never calls `accept` itself; it consumes filters
/// only as an indexing dimension. The order of filters in their owning
/// sequence defines the filter index used throughout the registry.
pub trait Filter<C> {
    /// Whether the candidate passes this filter.
    fn accept(&self, candidate: &C) -> bool;
    /// Filter name, used in group naming and diagnostics.
    fn name(&self) -> &str;
}

/// An opaque aggregate accumulator (binned statistic) owned by one
/// (event-filter, particle-filter…) slot of the registry.
pub trait AggregateGroup {
    /// Group name.
    fn name(&self) -> &str;
    /// Multiply accumulated contents by `factor` (event-count normalization).
    fn scale(&mut self, factor: f64);
    /// Zero accumulated contents without deallocating.
    fn reset(&mut self);
}

/// Ordered event- and particle-filter name lists shared across a task tree.
///
/// Tasks hold an `Arc<FilterSet>`: the set outlives every task that borrows
/// it and no task can mutate it. Filter order is fixed at construction and
/// defines the index mapping used by the registry and the acceptance
/// counters.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    event_filters: Vec<String>,
    particle_filters: Vec<String>,
}

impl FilterSet {
    /// Build a set from ordered filter-name lists.
    pub fn new(
        event_filters: impl IntoIterator<Item = impl Into<String>>,
        particle_filters: impl IntoIterator<Item = impl Into<String>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            event_filters: event_filters.into_iter().map(Into::into).collect(),
            particle_filters: particle_filters.into_iter().map(Into::into).collect(),
        })
    }

    /// An empty set (tasks that consume neither events nor particles).
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of event filters.
    pub fn n_event_filters(&self) -> usize {
        self.event_filters.len()
    }

    /// Number of particle filters.
    pub fn n_particle_filters(&self) -> usize {
        self.particle_filters.len()
    }

    /// Event-filter name at `index`.
    pub fn event_filter_name(&self, index: usize) -> Option<&str> {
        self.event_filters.get(index).map(String::as_str)
    }

    /// Particle-filter name at `index`.
    pub fn particle_filter_name(&self, index: usize) -> Option<&str> {
        self.particle_filters.get(index).map(String::as_str)
    }

    /// Ordered event-filter names.
    pub fn event_filter_names(&self) -> &[String] {
        &self.event_filters
    }

    /// Ordered particle-filter names.
    pub fn particle_filter_names(&self) -> &[String] {
        &self.particle_filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinPt(f64);

    impl Filter<f64> for MinPt {
        fn accept(&self, pt: &f64) -> bool {
            *pt >= self.0
        }
        fn name(&self) -> &str {
            "minPt"
        }
    }

    #[test]
    fn filter_contract() {
        let f = MinPt(0.2);
        assert!(f.accept(&0.5));
        assert!(!f.accept(&0.1));
        assert_eq!(f.name(), "minPt");
    }

    #[test]
    fn filter_set_order_defines_index() {
        let set = FilterSet::new(["MB", "central"], ["piPlus", "piMinus", "kaon"]);
        assert_eq!(set.n_event_filters(), 2);
        assert_eq!(set.n_particle_filters(), 3);
        assert_eq!(set.event_filter_name(1), Some("central"));
        assert_eq!(set.particle_filter_name(2), Some("kaon"));
        assert_eq!(set.particle_filter_name(3), None);
    }
}
