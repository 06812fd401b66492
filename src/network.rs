//! Validated, immutable description of a mass-action reaction network.

use crate::error::SimError;

/// Avogadro's constant (SI 2019 exact value), used when converting molar
/// rate constants into per-molecule ones.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Highest reaction order the propensity formulas cover.
pub const MAX_ORDER: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Reactant {
    pub(crate) species: usize,
    pub(crate) count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SpeciesDelta {
    pub(crate) species: usize,
    pub(crate) delta: i64,
}

#[derive(Clone, Debug)]
pub(crate) struct Reaction {
    pub(crate) rate_constant: f64,
    /// `rate_constant` divided by `(volume * N)^(order - 1)`.
    pub(crate) stochastic_rate: f64,
    pub(crate) order: u32,
    pub(crate) reactants: Vec<Reactant>,
    pub(crate) deltas: Vec<SpeciesDelta>,
}

/// Reactant/product stoichiometry, rate constants and volume of a network.
///
/// Built once through [`ReactionNetwork::new`] and then only read; replicate
/// workers share it by reference.
#[derive(Clone, Debug)]
pub struct ReactionNetwork {
    n_species: usize,
    reactant_stoic: Vec<u32>,
    product_stoic: Vec<u32>,
    reactions: Vec<Reaction>,
    /// Species consumed by at least one reaction.
    reactive_species: Vec<usize>,
    volume: f64,
    stochastic_scaling: bool,
}

fn flatten_matrix(rows: &[Vec<i64>], n_species: usize, name: &str) -> Result<Vec<u32>, SimError> {
    let mut flat = Vec::with_capacity(rows.len() * n_species);
    for (r, row) in rows.iter().enumerate() {
        if row.len() != n_species {
            return Err(SimError::Shape(format!(
                "{name} row {r} has {} entries, expected {n_species}",
                row.len()
            )));
        }
        for (s, &value) in row.iter().enumerate() {
            if value < 0 {
                return Err(SimError::InvalidArgument(format!(
                    "{name} cannot have negative elements (reaction {r}, species {s} is {value})"
                )));
            }
            let value = u32::try_from(value).map_err(|_| {
                SimError::InvalidArgument(format!(
                    "{name} entry at reaction {r}, species {s} is too large ({value})"
                ))
            })?;
            flat.push(value);
        }
    }
    Ok(flat)
}

impl ReactionNetwork {
    /// Validates the stoichiometry matrices (reactions are rows, species are
    /// columns) and rate constants. Volume starts at 1.0 with stochastic
    /// scaling off.
    pub fn new(
        reactant_stoic: &[Vec<i64>],
        product_stoic: &[Vec<i64>],
        rate_constants: &[f64],
    ) -> Result<Self, SimError> {
        let n_reactions = reactant_stoic.len();
        let n_species = reactant_stoic.first().map_or(0, Vec::len);
        if product_stoic.len() != n_reactions
            || product_stoic.first().map_or(0, Vec::len) != n_species
        {
            return Err(SimError::Shape(format!(
                "reactant and product stoichiometry must have the same shape ({}x{} vs {}x{})",
                n_reactions,
                n_species,
                product_stoic.len(),
                product_stoic.first().map_or(0, Vec::len)
            )));
        }
        if n_reactions == 0 || n_species == 0 {
            return Err(SimError::InvalidArgument(
                "stoichiometry must contain at least one reaction and one species".into(),
            ));
        }
        if rate_constants.len() != n_reactions {
            return Err(SimError::Shape(format!(
                "rate constant length {} does not match reaction count {}",
                rate_constants.len(),
                n_reactions
            )));
        }

        let reactant_flat = flatten_matrix(reactant_stoic, n_species, "reactant stoichiometry")?;
        let product_flat = flatten_matrix(product_stoic, n_species, "product stoichiometry")?;

        let mut reactions = Vec::with_capacity(n_reactions);
        for (idx, (react_row, prod_row)) in reactant_flat
            .chunks_exact(n_species)
            .zip(product_flat.chunks_exact(n_species))
            .enumerate()
        {
            let rate_constant = rate_constants[idx];
            if !rate_constant.is_finite() || rate_constant < 0.0 {
                return Err(SimError::InvalidArgument(format!(
                    "rate constant {idx} must be finite and non-negative, got {rate_constant}"
                )));
            }
            let order = react_row.iter().fold(0u32, |acc, &c| acc.saturating_add(c));
            if order > MAX_ORDER {
                return Err(SimError::UnsupportedOrder {
                    reaction: idx,
                    order,
                });
            }
            let reactants = react_row
                .iter()
                .enumerate()
                .filter_map(|(species, &count)| (count > 0).then_some(Reactant { species, count }))
                .collect();
            let deltas = react_row
                .iter()
                .zip(prod_row)
                .enumerate()
                .filter_map(|(species, (&r, &p))| {
                    let delta = i64::from(p) - i64::from(r);
                    (delta != 0).then_some(SpeciesDelta { species, delta })
                })
                .collect();
            reactions.push(Reaction {
                rate_constant,
                stochastic_rate: rate_constant,
                order,
                reactants,
                deltas,
            });
        }

        let reactive_species = (0..n_species)
            .filter(|&species| {
                reactant_flat
                    .chunks_exact(n_species)
                    .any(|row| row[species] > 0)
            })
            .collect();

        let mut network = Self {
            n_species,
            reactant_stoic: reactant_flat,
            product_stoic: product_flat,
            reactions,
            reactive_species,
            volume: 1.0,
            stochastic_scaling: false,
        };
        network.rescale()?;
        Ok(network)
    }

    /// Sets the reactor volume used for second and third order reactions.
    pub fn with_volume(mut self, volume: f64) -> Result<Self, SimError> {
        if !volume.is_finite() || volume <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "volume must be finite and positive, got {volume}"
            )));
        }
        self.volume = volume;
        self.rescale()?;
        Ok(self)
    }

    /// When set, rate constants are treated as molar and additionally divided
    /// by Avogadro's constant per extra reactant.
    pub fn with_stochastic_scaling(mut self, enabled: bool) -> Result<Self, SimError> {
        self.stochastic_scaling = enabled;
        self.rescale()?;
        Ok(self)
    }

    /// Recomputes every stochastic rate. A rate that overflows is rejected.
    fn rescale(&mut self) -> Result<(), SimError> {
        let avogadro = if self.stochastic_scaling { AVOGADRO } else { 1.0 };
        let base = self.volume * avogadro;
        for (idx, reaction) in self.reactions.iter_mut().enumerate() {
            let rate = match reaction.order {
                0 | 1 => reaction.rate_constant,
                order => reaction.rate_constant / base.powi(order as i32 - 1),
            };
            if !rate.is_finite() {
                return Err(SimError::InvalidArgument(format!(
                    "stochastic rate of reaction {idx} is not finite (k = {}, volume = {})",
                    reaction.rate_constant, self.volume
                )));
            }
            reaction.stochastic_rate = rate;
        }
        Ok(())
    }

    pub fn n_species(&self) -> usize {
        self.n_species
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn stochastic_scaling(&self) -> bool {
        self.stochastic_scaling
    }

    pub fn orders(&self) -> Vec<u32> {
        self.reactions.iter().map(|r| r.order).collect()
    }

    pub fn rate_constants(&self) -> Vec<f64> {
        self.reactions.iter().map(|r| r.rate_constant).collect()
    }

    /// Rate constants after volume (and optional Avogadro) scaling; these are
    /// the factors the propensities are built from.
    pub fn stochastic_rate_constants(&self) -> Vec<f64> {
        self.reactions.iter().map(|r| r.stochastic_rate).collect()
    }

    pub fn reactant_stoichiometry(&self, reaction: usize) -> &[u32] {
        let start = reaction * self.n_species;
        &self.reactant_stoic[start..start + self.n_species]
    }

    pub fn product_stoichiometry(&self, reaction: usize) -> &[u32] {
        let start = reaction * self.n_species;
        &self.product_stoic[start..start + self.n_species]
    }

    /// Dense `product - reactant` row for one reaction.
    pub fn net_stoichiometry(&self, reaction: usize) -> Vec<i64> {
        let mut row = vec![0i64; self.n_species];
        for delta in &self.reactions[reaction].deltas {
            row[delta.species] = delta.delta;
        }
        row
    }

    pub(crate) fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    #[cfg(test)]
    pub(crate) fn reactions_mut(&mut self) -> &mut [Reaction] {
        &mut self.reactions
    }

    /// True when no species that any reaction consumes is present. Species
    /// that only ever appear as products are sinks and do not count.
    pub fn is_extinct(&self, state: &[u64]) -> bool {
        self.reactive_species
            .iter()
            .all(|&species| state[species] == 0)
    }

    /// Checks an initial state against the network and converts it to counts.
    pub fn validate_state(&self, initial_state: &[i64]) -> Result<Vec<u64>, SimError> {
        if initial_state.len() != self.n_species {
            return Err(SimError::Shape(format!(
                "initial state length {} does not match number of species {}",
                initial_state.len(),
                self.n_species
            )));
        }
        initial_state
            .iter()
            .enumerate()
            .map(|(species, &count)| {
                u64::try_from(count).map_err(|_| {
                    SimError::InvalidArgument(format!(
                        "initial count of species {species} can't be negative ({count})"
                    ))
                })
            })
            .collect()
    }
}
