use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::driver::{Algorithm, SimulationStatus};
use crate::runner::ReplicateResult;

/// Replicates of one batch, in replicate-index order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Results {
    algorithm: Algorithm,
    replicates: Vec<ReplicateResult>,
}

impl Results {
    pub fn new(algorithm: Algorithm, replicates: Vec<ReplicateResult>) -> Self {
        Self {
            algorithm,
            replicates,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReplicateResult> {
        self.replicates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReplicateResult> {
        self.replicates.iter()
    }

    pub fn seeds(&self) -> Vec<u64> {
        self.replicates.iter().map(|r| r.seed).collect()
    }

    pub fn statuses(&self) -> Vec<SimulationStatus> {
        self.replicates.iter().map(|r| r.status).collect()
    }

    pub fn final_times(&self) -> Vec<f64> {
        self.replicates.iter().map(|r| r.final_time).collect()
    }

    pub fn final_states(&self) -> Vec<&[u64]> {
        self.replicates
            .iter()
            .filter_map(|r| r.trajectory.final_state())
            .collect()
    }

    /// State of every replicate at time `t`; `None` entries mark replicates
    /// that have no sample at or before `t`.
    pub fn states_at(&self, t: f64) -> Vec<Option<&[u64]>> {
        self.replicates
            .iter()
            .map(|r| r.trajectory.state_at(t))
            .collect()
    }

    pub fn status_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for replicate in &self.replicates {
            *counts.entry(replicate.status.code()).or_insert(0) += 1;
        }
        counts
    }

    pub fn into_replicates(self) -> Vec<ReplicateResult> {
        self.replicates
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a ReplicateResult;
    type IntoIter = std::slice::Iter<'a, ReplicateResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.replicates.iter()
    }
}

impl IntoIterator for Results {
    type Item = ReplicateResult;
    type IntoIter = std::vec::IntoIter<ReplicateResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.replicates.into_iter()
    }
}
