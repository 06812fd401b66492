//! Python entry point: raw numpy inputs in, per-replicate arrays out.

use numpy::{
    PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray1, PyReadonlyArray2,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::driver::{Algorithm, SimulationOptions};
use crate::error::SimError;
use crate::network::ReactionNetwork;
use crate::runner::run_replicates;

impl From<SimError> for PyErr {
    fn from(err: SimError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn matrix_rows(array: PyReadonlyArray2<i64>, name: &str) -> Result<Vec<Vec<i64>>, SimError> {
    let shape = array.shape();
    let (rows, cols) = (shape[0], shape[1]);
    let data = array
        .as_slice()
        .map_err(|_| SimError::Shape(format!("{name} must be contiguous")))?;
    if cols == 0 {
        return Ok(vec![Vec::new(); rows]);
    }
    Ok(data.chunks(cols).map(<[i64]>::to_vec).collect())
}

fn vector<T: Copy + numpy::Element>(
    array: PyReadonlyArray1<T>,
    name: &str,
) -> Result<Vec<T>, SimError> {
    array
        .as_slice()
        .map(<[T]>::to_vec)
        .map_err(|_| SimError::Shape(format!("{name} array must be contiguous")))
}

type ReplicateArrays = (Py<PyArray1<f64>>, Py<PyArray2<u64>>, i32);

/// Simulates `n_rep` replicates and returns `(times, states, status)` per
/// replicate.
#[pyfunction(signature = (
    react_stoic,
    prod_stoic,
    init_state,
    k_det,
    max_t=10.0,
    max_iter=1000,
    volume=1.0,
    chem_flag=false,
    seed=None,
    n_rep=1,
    algorithm="direct_naive",
    n_threads=None
))]
#[allow(clippy::too_many_arguments)]
pub fn simulate(
    py: Python<'_>,
    react_stoic: PyReadonlyArray2<i64>,
    prod_stoic: PyReadonlyArray2<i64>,
    init_state: PyReadonlyArray1<i64>,
    k_det: PyReadonlyArray1<f64>,
    max_t: f64,
    max_iter: usize,
    volume: f64,
    chem_flag: bool,
    seed: Option<Vec<u64>>,
    n_rep: usize,
    algorithm: &str,
    n_threads: Option<usize>,
) -> PyResult<Vec<ReplicateArrays>> {
    let reactants = matrix_rows(react_stoic, "react_stoic")?;
    let products = matrix_rows(prod_stoic, "prod_stoic")?;
    let initial_state = vector(init_state, "init_state")?;
    let rate_constants = vector(k_det, "k_det")?;
    let network = ReactionNetwork::new(&reactants, &products, &rate_constants)?
        .with_volume(volume)?
        .with_stochastic_scaling(chem_flag)?;
    let options = SimulationOptions {
        max_t,
        max_iter,
        algorithm: algorithm.parse::<Algorithm>()?,
        n_threads,
    };

    let results = py.detach(move || {
        run_replicates(&network, &initial_state, &options, n_rep, seed.as_deref())
    })?;

    results
        .into_iter()
        .map(|replicate| -> PyResult<ReplicateArrays> {
            let trajectory = &replicate.trajectory;
            let times = PyArray1::from_slice(py, trajectory.times());
            let states = PyArray1::from_slice(py, trajectory.flat_states())
                .reshape([trajectory.len(), trajectory.n_species()])?;
            Ok((times.unbind(), states.unbind(), replicate.status.code()))
        })
        .collect()
}

#[pymodule]
fn stochsim(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(simulate, module)?)?;
    Ok(())
}
