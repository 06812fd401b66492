//! Sample storage for a single replicate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on samples reserved up front, so a huge iteration budget does
/// not turn into a huge allocation before the first step.
const PREALLOCATED_SAMPLES: usize = 1 << 16;

/// Append-only `(time, state)` store sized for `max_iter + 1` samples.
#[derive(Debug)]
pub struct TrajectoryBuffer {
    n_species: usize,
    capacity: usize,
    times: Vec<f64>,
    states: Vec<u64>,
}

impl TrajectoryBuffer {
    pub fn new(n_species: usize, max_iter: usize) -> Self {
        let capacity = max_iter.saturating_add(1);
        let reserved = capacity.min(PREALLOCATED_SAMPLES);
        Self {
            n_species,
            capacity,
            times: Vec::with_capacity(reserved),
            states: Vec::with_capacity(reserved.saturating_mul(n_species)),
        }
    }

    pub fn record(&mut self, time: f64, state: &[u64]) {
        debug_assert_eq!(state.len(), self.n_species);
        debug_assert!(self.times.last().map_or(true, |&last| last <= time));
        self.times.push(time);
        self.states.extend_from_slice(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.times.len() >= self.capacity
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Trims to the written prefix.
    pub fn into_trajectory(mut self) -> Trajectory {
        self.times.shrink_to_fit();
        self.states.shrink_to_fit();
        Trajectory {
            n_species: self.n_species,
            times: self.times,
            states: self.states,
        }
    }
}

/// Recorded samples of one run, starting with `(0, initial state)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    n_species: usize,
    times: Vec<f64>,
    /// Row-major, `len() * n_species` counts.
    states: Vec<u64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn state(&self, index: usize) -> &[u64] {
        let start = index * self.n_species;
        &self.states[start..start + self.n_species]
    }

    pub fn states(&self) -> impl Iterator<Item = &[u64]> + '_ {
        self.states.chunks_exact(self.n_species.max(1))
    }

    pub fn flat_states(&self) -> &[u64] {
        &self.states
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &[u64])> + '_ {
        self.times.iter().copied().zip(self.states())
    }

    pub fn final_state(&self) -> Option<&[u64]> {
        self.len().checked_sub(1).map(|last| self.state(last))
    }

    /// State in effect at time `t`: the last sample recorded at or before it.
    pub fn state_at(&self, t: f64) -> Option<&[u64]> {
        if t.is_nan() {
            return None;
        }
        let idx = self.times.partition_point(|&sample| sample <= t);
        idx.checked_sub(1).map(|idx| self.state(idx))
    }

    pub fn totals(&self) -> Vec<u64> {
        self.states().map(|state| state.iter().sum()).collect()
    }
}
