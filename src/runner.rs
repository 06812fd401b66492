//! Seeded replicate execution, sequential or on a rayon pool.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::driver::{SimulationOptions, SimulationStatus};
use crate::error::SimError;
use crate::network::ReactionNetwork;
use crate::results::Results;
use crate::trajectory::Trajectory;

/// One replicate's trajectory, how it ended, and the seed that produced it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplicateResult {
    pub seed: u64,
    pub final_time: f64,
    pub trajectory: Trajectory,
    pub status: SimulationStatus,
}

/// Simulates a single replicate with a fresh RNG stream built from `seed`.
pub fn run_replicate(
    network: &ReactionNetwork,
    initial_state: &[i64],
    max_t: f64,
    max_iter: usize,
    seed: u64,
) -> Result<ReplicateResult, SimError> {
    let options = SimulationOptions {
        max_t,
        max_iter,
        ..SimulationOptions::default()
    };
    options.validate()?;
    let state = network.validate_state(initial_state)?;
    Ok(simulate_seeded(network, &state, &options, seed))
}

/// Explicit seeds must number `n_rep`; otherwise replicate `i` gets seed `i`.
pub fn resolve_seeds(seeds: Option<&[u64]>, n_rep: usize) -> Result<Vec<u64>, SimError> {
    match seeds {
        Some(seeds) if seeds.len() != n_rep => Err(SimError::Shape(format!(
            "seed list length {} does not match number of replicates {}",
            seeds.len(),
            n_rep
        ))),
        Some(seeds) => Ok(seeds.to_vec()),
        None => Ok((0..n_rep as u64).collect()),
    }
}

/// Runs `n_rep` independent replicates from the same initial state.
///
/// Output order follows replicate index regardless of which worker finishes
/// first.
pub fn run_replicates(
    network: &ReactionNetwork,
    initial_state: &[i64],
    options: &SimulationOptions,
    n_rep: usize,
    seeds: Option<&[u64]>,
) -> Result<Results, SimError> {
    if n_rep == 0 {
        return Err(SimError::InvalidArgument(
            "number of replicates must be greater than zero".into(),
        ));
    }
    options.validate()?;
    let seeds = resolve_seeds(seeds, n_rep)?;
    let state = network.validate_state(initial_state)?;

    log::info!(
        "running {} replicate(s) with {} (max_t = {}, max_iter = {}, threads = {:?})",
        n_rep,
        options.algorithm,
        options.max_t,
        options.max_iter,
        options.n_threads
    );

    let simulate = || -> Vec<ReplicateResult> {
        seeds
            .par_iter()
            .map(|&seed| simulate_seeded(network, &state, options, seed))
            .collect()
    };

    let replicates = match options.n_threads {
        Some(n) => ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?
            .install(simulate),
        None => simulate(),
    };

    Ok(Results::new(options.algorithm, replicates))
}

fn simulate_seeded(
    network: &ReactionNetwork,
    state: &[u64],
    options: &SimulationOptions,
    seed: u64,
) -> ReplicateResult {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let outcome = options
        .algorithm
        .simulate(network, state, options.max_t, options.max_iter, rng);

    if outcome.status.is_success() {
        log::debug!(
            "seed {seed}: {} after {} event(s), t = {}",
            outcome.status,
            outcome.trajectory.len() - 1,
            outcome.final_time
        );
    } else {
        log::warn!(
            "seed {seed}: {} after {} event(s), t = {}",
            outcome.status,
            outcome.trajectory.len() - 1,
            outcome.final_time
        );
    }

    ReplicateResult {
        seed,
        final_time: outcome.final_time,
        trajectory: outcome.trajectory,
        status: outcome.status,
    }
}
