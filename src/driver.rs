//! Per-replicate control loop and its terminal statuses.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::network::ReactionNetwork;
use crate::propensity::{self, PropensityError};
use crate::sampler::{self, InvalidPropensities};
use crate::trajectory::{Trajectory, TrajectoryBuffer};

/// How a replicate ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SimulationStatus {
    /// The trajectory holds `max_iter + 1` samples.
    MaxIterReached,
    /// The next event would land at or past `max_t`.
    MaxTimeReached,
    /// Every species that some reaction consumes has count zero.
    AllExtinct,
    /// A reaction of order above 3 reached the propensity evaluator.
    InvalidOrder,
    /// All propensities vanished while some consumable species is present.
    ZeroPropensityNotExtinct,
    /// A propensity, or their sum, came out NaN, infinite or negative.
    InvalidPropensity,
}

impl SimulationStatus {
    /// Integer status codes: positive for normal completion, negative for
    /// failures.
    pub fn code(self) -> i32 {
        match self {
            Self::MaxIterReached => 1,
            Self::MaxTimeReached => 2,
            Self::AllExtinct => 3,
            Self::InvalidOrder => -1,
            Self::ZeroPropensityNotExtinct => -2,
            Self::InvalidPropensity => -3,
        }
    }

    pub fn is_success(self) -> bool {
        self.code() > 0
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MaxIterReached => "maximum iterations reached",
            Self::MaxTimeReached => "maximum time reached",
            Self::AllExtinct => "all species extinct",
            Self::InvalidOrder => "reaction order above 3",
            Self::ZeroPropensityNotExtinct => "propensities zero without extinction",
            Self::InvalidPropensity => "propensity not finite or negative",
        };
        f.write_str(text)
    }
}

/// Simulation algorithm. Only the exact direct method exists today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Algorithm {
    #[default]
    Direct,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Direct => "direct",
        }
    }

    /// Runs one replicate to termination.
    pub fn simulate<R: Rng>(
        self,
        network: &ReactionNetwork,
        initial_state: &[u64],
        max_t: f64,
        max_iter: usize,
        rng: R,
    ) -> RunOutcome {
        match self {
            Self::Direct => {
                SimulationDriver::new(network, initial_state, max_t, max_iter, rng).run()
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SimError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "direct" | "direct_naive" => Ok(Self::Direct),
            other => Err(SimError::InvalidArgument(format!(
                "requested algorithm '{other}' is not supported"
            ))),
        }
    }
}

/// Run-level settings shared by every replicate of a batch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationOptions {
    pub max_t: f64,
    /// Maximum number of reaction events per replicate.
    pub max_iter: usize,
    pub algorithm: Algorithm,
    /// Size of a dedicated worker pool; `None` uses rayon's global pool.
    pub n_threads: Option<usize>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            max_t: 10.0,
            max_iter: 1000,
            algorithm: Algorithm::Direct,
            n_threads: None,
        }
    }
}

impl SimulationOptions {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.max_t.is_nan() || self.max_t <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "max_t must be positive, got {}",
                self.max_t
            )));
        }
        if self.n_threads == Some(0) {
            return Err(SimError::InvalidArgument(
                "n_threads must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Time of the last event, or `max_t` when the time limit ended the run.
    pub final_time: f64,
    pub trajectory: Trajectory,
    pub status: SimulationStatus,
}

/// Direct-method stepper for a single replicate.
///
/// Each [`step`](Self::step) either applies one event or terminates; the gap
/// between steps is where a caller may stop early.
pub struct SimulationDriver<'a, R> {
    network: &'a ReactionNetwork,
    rng: R,
    state: Vec<u64>,
    propensities: Vec<f64>,
    buffer: TrajectoryBuffer,
    time: f64,
    max_t: f64,
    status: Option<SimulationStatus>,
}

impl<'a, R: Rng> SimulationDriver<'a, R> {
    pub fn new(
        network: &'a ReactionNetwork,
        initial_state: &[u64],
        max_t: f64,
        max_iter: usize,
        rng: R,
    ) -> Self {
        debug_assert_eq!(initial_state.len(), network.n_species());
        let mut buffer = TrajectoryBuffer::new(network.n_species(), max_iter);
        buffer.record(0.0, initial_state);
        Self {
            network,
            rng,
            state: initial_state.to_vec(),
            propensities: vec![0.0; network.n_reactions()],
            buffer,
            time: 0.0,
            max_t,
            status: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &[u64] {
        &self.state
    }

    pub fn steps(&self) -> usize {
        self.buffer.len() - 1
    }

    pub fn status(&self) -> Option<SimulationStatus> {
        self.status
    }

    /// Advances by one event. Returns the status once the run has terminated;
    /// further calls keep returning it.
    pub fn step(&mut self) -> Option<SimulationStatus> {
        if self.status.is_none() {
            self.status = self.advance();
        }
        self.status
    }

    fn advance(&mut self) -> Option<SimulationStatus> {
        if self.buffer.is_full() {
            return Some(SimulationStatus::MaxIterReached);
        }
        if let Err(err) =
            propensity::evaluate_into(self.network, &self.state, &mut self.propensities)
        {
            return Some(match err {
                PropensityError::InvalidOrder { reaction, order } => {
                    log::warn!(
                        "reaction {reaction} reached propensity evaluation with order {order}"
                    );
                    SimulationStatus::InvalidOrder
                }
                PropensityError::InvalidValue { reaction, value } => {
                    log::warn!("reaction {reaction} has propensity {value} at t = {}", self.time);
                    SimulationStatus::InvalidPropensity
                }
            });
        }

        let event = match sampler::sample_event(&self.propensities, &mut self.rng) {
            Ok(Some(event)) => event,
            Ok(None) if self.network.is_extinct(&self.state) => {
                return Some(SimulationStatus::AllExtinct);
            }
            Ok(None) => return Some(SimulationStatus::ZeroPropensityNotExtinct),
            Err(InvalidPropensities { total }) => {
                log::warn!("propensities sum to {total} at t = {}", self.time);
                return Some(SimulationStatus::InvalidPropensity);
            }
        };

        let next_time = self.time + event.tau;
        if next_time >= self.max_t {
            self.time = self.max_t;
            return Some(SimulationStatus::MaxTimeReached);
        }

        self.time = next_time;
        for delta in &self.network.reactions()[event.reaction].deltas {
            let count = &mut self.state[delta.species];
            debug_assert!(delta.delta >= 0 || *count >= delta.delta.unsigned_abs());
            *count = count.saturating_add_signed(delta.delta);
        }
        self.buffer.record(self.time, &self.state);
        None
    }

    /// Steps until termination and returns the trimmed trajectory.
    pub fn run(mut self) -> RunOutcome {
        let status = loop {
            if let Some(status) = self.step() {
                break status;
            }
        };
        RunOutcome {
            final_time: self.time,
            trajectory: self.buffer.into_trajectory(),
            status,
        }
    }
}
