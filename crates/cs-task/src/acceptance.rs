//! Accepted-event and accepted-particle counters.
//!
//! One event counter per event filter; one particle counter per
//! (event filter, particle filter) pair. Incremented during `execute()`,
//! read by the scaling pass, persisted as named scalars.

use cs_core::Result;
use cs_store::Store;

/// Per-filter acceptance counts for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptanceCounters {
    accepted_events: Vec<u64>,
    accepted_particles: Vec<Vec<u64>>,
}

impl AcceptanceCounters {
    /// Allocate counters for `n_event_filters` × `n_particle_filters`.
    pub fn new(n_event_filters: usize, n_particle_filters: usize) -> Self {
        Self {
            accepted_events: vec![0; n_event_filters],
            accepted_particles: vec![vec![0; n_particle_filters]; n_event_filters],
        }
    }

    /// Unallocated counters (task does not aggregate).
    pub fn unallocated() -> Self {
        Self::default()
    }

    /// True when no counters are allocated.
    pub fn is_allocated(&self) -> bool {
        !self.accepted_events.is_empty()
    }

    /// Number of event filters covered.
    pub fn n_event_filters(&self) -> usize {
        self.accepted_events.len()
    }

    /// Number of particle filters covered.
    pub fn n_particle_filters(&self) -> usize {
        self.accepted_particles.first().map(Vec::len).unwrap_or(0)
    }

    /// Record an accepted event for event filter `ef`.
    ///
    /// Out-of-range indices are ignored with a debug log: counters may
    /// legitimately be unallocated when aggregation was disabled.
    pub fn increment_event(&mut self, ef: usize) {
        match self.accepted_events.get_mut(ef) {
            Some(c) => *c += 1,
            None => tracing::debug!(ef, "event increment on unallocated counter"),
        }
    }

    /// Record an accepted particle for (event filter `ef`, particle filter `pf`).
    pub fn increment_particle(&mut self, ef: usize, pf: usize) {
        match self.accepted_particles.get_mut(ef).and_then(|r| r.get_mut(pf)) {
            Some(c) => *c += 1,
            None => tracing::debug!(ef, pf, "particle increment on unallocated counter"),
        }
    }

    /// Accepted events for event filter `ef` (0 when unallocated).
    pub fn accepted_events(&self, ef: usize) -> u64 {
        self.accepted_events.get(ef).copied().unwrap_or(0)
    }

    /// Accepted particles for (event filter `ef`, particle filter `pf`).
    pub fn accepted_particles(&self, ef: usize, pf: usize) -> u64 {
        self.accepted_particles
            .get(ef)
            .and_then(|r| r.get(pf))
            .copied()
            .unwrap_or(0)
    }

    /// Zero all counters, keeping the allocation.
    pub fn reset(&mut self) {
        self.accepted_events.fill(0);
        for row in &mut self.accepted_particles {
            row.fill(0);
        }
    }

    /// Release all counter storage.
    pub fn clear(&mut self) {
        self.accepted_events.clear();
        self.accepted_particles.clear();
    }

    /// Persist all counters into `store` as named scalars.
    pub fn save(&self, store: &mut Store) -> Result<()> {
        for (ef, n) in self.accepted_events.iter().enumerate() {
            store.put_long(&event_scalar_name(ef), *n as i64)?;
        }
        for (ef, row) in self.accepted_particles.iter().enumerate() {
            for (pf, n) in row.iter().enumerate() {
                store.put_long(&particle_scalar_name(ef, pf), *n as i64)?;
            }
        }
        Ok(())
    }

    /// Reload counters for the given filter counts from `store`.
    pub fn load(store: &Store, n_event_filters: usize, n_particle_filters: usize) -> Result<Self> {
        let mut counters = Self::new(n_event_filters, n_particle_filters);
        for ef in 0..n_event_filters {
            counters.accepted_events[ef] = store.get_long(&event_scalar_name(ef))? as u64;
            for pf in 0..n_particle_filters {
                counters.accepted_particles[ef][pf] =
                    store.get_long(&particle_scalar_name(ef, pf))? as u64;
            }
        }
        Ok(counters)
    }
}

fn event_scalar_name(ef: usize) -> String {
    format!("acceptedEvents_{ef}")
}

fn particle_scalar_name(ef: usize, pf: usize) -> String {
    format!("acceptedParticles_{ef}_{pf}")
}
