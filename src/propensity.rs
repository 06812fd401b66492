//! Mass-action propensities for reactions of order 0 through 3.

use crate::network::{Reaction, ReactionNetwork, MAX_ORDER};

/// Why a propensity could not be evaluated.
///
/// Construction already rules both out, so seeing one at evaluation time
/// means an internal invariant was broken.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropensityError {
    /// The reaction's order has no propensity formula.
    InvalidOrder { reaction: usize, order: u32 },
    /// The propensity came out NaN, infinite or negative.
    InvalidValue { reaction: usize, value: f64 },
}

/// Number of ways to pick `k` indistinguishable molecules out of `n`.
#[inline]
pub(crate) fn combinations(n: u64, k: u32) -> Option<f64> {
    let wide = u128::from(n);
    match k {
        0 => Some(1.0),
        1 => Some(n as f64),
        2 => Some((wide * wide.saturating_sub(1) / 2) as f64),
        3 if n < 3 => Some(0.0),
        3 => {
            let exact = (wide * (wide - 1))
                .checked_mul(wide - 2)
                .map(|product| (product / 6) as f64);
            Some(exact.unwrap_or_else(|| {
                let n = n as f64;
                n * (n - 1.0) * (n - 2.0) / 6.0
            }))
        }
        _ => None,
    }
}

impl Reaction {
    #[inline]
    pub(crate) fn propensity(&self, state: &[u64]) -> Option<f64> {
        if self.order > MAX_ORDER {
            return None;
        }
        let combinatorial = match self.reactants.as_slice() {
            [] => 1.0,
            [a] => combinations(state[a.species], a.count)?,
            [a, b] => {
                combinations(state[a.species], a.count)? * combinations(state[b.species], b.count)?
            }
            [a, b, c] => {
                combinations(state[a.species], a.count)?
                    * combinations(state[b.species], b.count)?
                    * combinations(state[c.species], c.count)?
            }
            _ => return None,
        };
        Some(self.stochastic_rate * combinatorial)
    }
}

/// Fills `propensities` for the given state and returns their sum.
pub fn evaluate_into(
    network: &ReactionNetwork,
    state: &[u64],
    propensities: &mut [f64],
) -> Result<f64, PropensityError> {
    debug_assert_eq!(state.len(), network.n_species());
    debug_assert_eq!(propensities.len(), network.n_reactions());
    let mut total = 0.0;
    for (idx, (reaction, slot)) in network
        .reactions()
        .iter()
        .zip(propensities.iter_mut())
        .enumerate()
    {
        let value = reaction
            .propensity(state)
            .ok_or(PropensityError::InvalidOrder {
                reaction: idx,
                order: reaction.order,
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(PropensityError::InvalidValue {
                reaction: idx,
                value,
            });
        }
        *slot = value;
        total += value;
    }
    Ok(total)
}

/// Allocating convenience over [`evaluate_into`].
pub fn evaluate(network: &ReactionNetwork, state: &[u64]) -> Result<Vec<f64>, PropensityError> {
    let mut propensities = vec![0.0; network.n_reactions()];
    evaluate_into(network, state, &mut propensities)?;
    Ok(propensities)
}

