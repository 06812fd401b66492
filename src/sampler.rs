//! Two-draw event selection of the direct method.

use rand::distributions::Open01;
use rand::Rng;

/// Waiting time until the next reaction and which reaction fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub tau: f64,
    pub reaction: usize,
}

/// Propensities that cannot be sampled from: a NaN or negative entry, or a
/// sum that is not finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidPropensities {
    pub total: f64,
}

/// Picks the next event from two uniforms in (0, 1).
///
/// Returns `Ok(None)` when every propensity is zero. `tau = -ln(u1) / a0` and
/// the reaction is the first index whose cumulative propensity exceeds
/// `u2 * a0`.
pub fn select_event(
    propensities: &[f64],
    u1: f64,
    u2: f64,
) -> Result<Option<Event>, InvalidPropensities> {
    let total: f64 = propensities.iter().sum();
    if !total.is_finite() || propensities.iter().any(|&p| p < 0.0) {
        return Err(InvalidPropensities { total });
    }
    if total == 0.0 {
        return Ok(None);
    }
    debug_assert!(u1 > 0.0 && u1 <= 1.0);
    let tau = -u1.ln() / total;
    let target = u2 * total;

    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (idx, &value) in propensities.iter().enumerate() {
        cumulative += value;
        if value > 0.0 {
            last_positive = idx;
        }
        if cumulative > target {
            return Ok(Some(Event { tau, reaction: idx }));
        }
    }
    // `target` rounded onto or past the final sum; a zero-propensity tail
    // entry must never be picked.
    Ok(Some(Event {
        tau,
        reaction: last_positive,
    }))
}

/// Draws `u1` then `u2` from the open interval (0, 1).
#[inline]
pub fn draw_uniforms<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.sample(Open01);
    (u1, u2)
}

/// [`select_event`] fed from `rng`. Nothing is drawn when every propensity
/// is zero.
pub fn sample_event<R: Rng + ?Sized>(
    propensities: &[f64],
    rng: &mut R,
) -> Result<Option<Event>, InvalidPropensities> {
    if propensities.iter().all(|&p| p == 0.0) {
        return Ok(None);
    }
    let (u1, u2) = draw_uniforms(rng);
    select_event(propensities, u1, u2)
}
