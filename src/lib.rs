//! Exact stochastic simulation of mass-action reaction networks with the
//! Gillespie direct method.
//!
//! A [`ReactionNetwork`] is validated once and shared read-only by every
//! replicate. Each replicate owns its state vector, a `ChaCha8Rng` stream
//! seeded from its own seed, and a pre-sized trajectory buffer.
//!
//! ```
//! use stochsim::{run_replicate, ReactionNetwork, SimulationStatus};
//!
//! // A -> B -> C
//! let network = ReactionNetwork::new(
//!     &[vec![1, 0, 0], vec![0, 1, 0]],
//!     &[vec![0, 1, 0], vec![0, 0, 1]],
//!     &[1.0, 1.0],
//! )?;
//! let result = run_replicate(&network, &[100, 0, 0], 10.0, 1000, 0)?;
//! assert_ne!(result.status, SimulationStatus::ZeroPropensityNotExtinct);
//! # Ok::<(), stochsim::SimError>(())
//! ```

mod driver;
mod error;
mod network;
pub mod propensity;
mod results;
mod runner;
pub mod sampler;
mod trajectory;

#[cfg(feature = "python")]
mod python;

pub use driver::{Algorithm, RunOutcome, SimulationDriver, SimulationOptions, SimulationStatus};
pub use error::SimError;
pub use network::{ReactionNetwork, AVOGADRO, MAX_ORDER};
pub use results::Results;
pub use runner::{resolve_seeds, run_replicate, run_replicates, ReplicateResult};
pub use trajectory::{Trajectory, TrajectoryBuffer};
