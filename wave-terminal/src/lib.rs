//! Explicit FDTD solver for the 2D scalar wave equation with first-order Mur
//! absorbing edges and a Gaussian-modulated point source, plus a terminal
//! renderer for watching the field evolve.

pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod visualisation;
pub mod wavefield;

pub use config::{DisplayConfig, PaletteKind, PhysicalConfig};
pub use error::{Result, SimError};
pub use grid::Grid;
pub use simulation::{Frame, RunSummary, Simulation, SimulationParameters};
pub use solver::FieldSolver;
pub use source::GaussianPulse;
pub use wavefield::{FieldState, TimeLevel};
