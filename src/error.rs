use thiserror::Error;

/// Errors raised before any simulation starts.
///
/// Runtime outcomes of a replicate are reported through
/// [`SimulationStatus`](crate::SimulationStatus) instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("shape mismatch: {0}")]
    Shape(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("reaction {reaction} has order {order}; orders above 3 are not supported")]
    UnsupportedOrder { reaction: usize, order: u32 },
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
