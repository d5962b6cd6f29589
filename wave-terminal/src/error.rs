use std::collections::TryReserveError;
use thiserror::Error;

/// Errors raised while setting up a simulation.
///
/// Stepping itself cannot fail; everything here happens before the first step.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("grid of {nx}x{ny} nodes does not fit in the address space")]
    GridTooLarge { nx: usize, ny: usize },

    #[error("failed to allocate {nx}x{ny} field grid")]
    Allocation {
        nx: usize,
        ny: usize,
        #[source]
        source: TryReserveError,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, SimError>;
