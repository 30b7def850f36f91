//! A minimal concrete aggregate group: a fixed-width 1D binned accumulator.
//!
//! Analyses with richer observables supply their own [`AggregateGroup`]
//! implementation; this one covers the default pipeline and the tests.

use cs_core::AggregateGroup;
use serde::{Deserialize, Serialize};

/// A 1D binned accumulator with per-bin sum of weights and weights squared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedGroup {
    /// Group name (task + filter combination).
    pub name: String,
    /// Bin edges (length = n_bins + 1).
    pub bin_edges: Vec<f64>,
    /// Sum of weights per bin.
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Entries accepted into the range.
    pub entries: u64,
}

impl BinnedGroup {
    /// Create a group with `n_bins` equal-width bins over `[x_min, x_max)`.
    pub fn new(name: impl Into<String>, n_bins: usize, x_min: f64, x_max: f64) -> Self {
        let width = (x_max - x_min) / n_bins as f64;
        let bin_edges = (0..=n_bins).map(|i| x_min + i as f64 * width).collect();
        Self {
            name: name.into(),
            bin_edges,
            bin_content: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            entries: 0,
        }
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Accumulate `weight` at `value`. Out-of-range values are dropped.
    pub fn fill(&mut self, value: f64, weight: f64) {
        let edges = &self.bin_edges;
        if value < edges[0] || value >= edges[edges.len() - 1] {
            return;
        }
        let width = (edges[edges.len() - 1] - edges[0]) / self.n_bins() as f64;
        let bin = (((value - edges[0]) / width) as usize).min(self.n_bins() - 1);
        self.bin_content[bin] += weight;
        self.sumw2[bin] += weight * weight;
        self.entries += 1;
    }

    /// Sum of all bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }
}

impl AggregateGroup for BinnedGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn scale(&mut self, factor: f64) {
        for c in &mut self.bin_content {
            *c *= factor;
        }
        let f2 = factor * factor;
        for s in &mut self.sumw2 {
            *s *= f2;
        }
    }

    fn reset(&mut self) {
        self.bin_content.fill(0.0);
        self.sumw2.fill(0.0);
        self.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_drop_out_of_range() {
        let mut g = BinnedGroup::new("h", 4, 0.0, 2.0);
        g.fill(0.25, 1.0);
        g.fill(1.75, 2.0);
        g.fill(-0.1, 1.0);
        g.fill(2.0, 1.0);
        assert_eq!(g.bin_content, vec![1.0, 0.0, 0.0, 2.0]);
        assert_eq!(g.entries, 2);
    }

    #[test]
    fn scale_applies_to_contents_and_sumw2() {
        let mut g = BinnedGroup::new("h", 2, 0.0, 2.0);
        g.fill(0.5, 2.0);
        g.scale(0.5);
        assert_eq!(g.bin_content, vec![1.0, 0.0]);
        assert_eq!(g.sumw2, vec![1.0, 0.0]);
    }

    #[test]
    fn reset_zeroes_without_reallocating() {
        let mut g = BinnedGroup::new("h", 3, 0.0, 3.0);
        g.fill(1.5, 1.0);
        g.reset();
        assert_eq!(g.bin_content, vec![0.0; 3]);
        assert_eq!(g.entries, 0);
        assert_eq!(g.n_bins(), 3);
    }
}
