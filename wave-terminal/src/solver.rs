//! Explicit leapfrog update of the 2D scalar wave equation.
//!
//! One step writes every cell of the `next` level exactly once, in a fixed
//! order: interior stencil, source node, Mur edges, corners. The edge pass
//! reads freshly written interior neighbours and the corner pass reads the
//! edges, so the order cannot change.

use crate::simulation::SimulationParameters;
use crate::wavefield::FieldState;
use ndarray::Array2;

pub struct FieldSolver {
    params: SimulationParameters,
    ox2: f64,
    oy2: f64,
    mur_x: f64, // Mur coefficient for the left/right edges
    mur_y: f64, // Mur coefficient for the bottom/top edges
}

impl FieldSolver {
    pub fn new(params: SimulationParameters) -> Self {
        let c_dt = params.wave_speed() * params.dt();
        let dx = params.grid().dx;
        let dy = params.grid().dy;

        Self {
            ox2: params.courant_x().powi(2),
            oy2: params.courant_y().powi(2),
            mur_x: (c_dt - dx) / (c_dt + dx),
            mur_y: (c_dt - dy) / (c_dt + dy),
            params,
        }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn mur_coefficients(&self) -> (f64, f64) {
        (self.mur_x, self.mur_y)
    }

    /// Computes level n+1 into `state.next()` for step index `n`.
    pub fn step(&self, state: &mut FieldState, n: usize) {
        let grid = self.params.grid();
        debug_assert_eq!(
            state.dim(),
            (grid.nx, grid.ny),
            "field state does not match the solver's grid"
        );
        let (next, current, previous) = state.levels_mut();
        self.update_interior(next, current, previous);
        self.inject_source(next, n);
        self.apply_absorbing_edges(next, current);
        Self::average_corners(next);
    }

    /// Cycles the time levels after a completed step.
    pub fn rotate(&self, state: &mut FieldState) {
        state.rotate();
    }

    pub(crate) fn update_interior(
        &self,
        next: &mut Array2<f64>,
        current: &Array2<f64>,
        previous: &Array2<f64>,
    ) {
        let (nx, ny) = current.dim();
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let u = current[[i, j]];
                let d2x = current[[i + 1, j]] - 2.0 * u + current[[i - 1, j]];
                let d2y = current[[i, j + 1]] - 2.0 * u + current[[i, j - 1]];
                next[[i, j]] = 2.0 * u + self.ox2 * d2x + self.oy2 * d2y - previous[[i, j]];
            }
        }
    }

    /// Overwrites the source node; the stencil value there is discarded.
    pub(crate) fn inject_source(&self, next: &mut Array2<f64>, n: usize) {
        let (xs, ys) = self.params.source_node();
        next[[xs, ys]] = self.params.source_value(n);
    }

    /// First-order Mur extrapolation on the four edges, corners excluded.
    pub(crate) fn apply_absorbing_edges(&self, next: &mut Array2<f64>, current: &Array2<f64>) {
        let (nx, ny) = current.dim();
        let (kx, ky) = (self.mur_x, self.mur_y);

        for j in 1..ny - 1 {
            // Left
            next[[0, j]] = current[[1, j]] + kx * (next[[1, j]] - current[[0, j]]);
            // Right
            let r = nx - 1;
            next[[r, j]] = current[[r - 1, j]] + kx * (next[[r - 1, j]] - current[[r, j]]);
        }

        for i in 1..nx - 1 {
            // Bottom
            next[[i, 0]] = current[[i, 1]] + ky * (next[[i, 1]] - current[[i, 0]]);
            // Top
            let t = ny - 1;
            next[[i, t]] = current[[i, t - 1]] + ky * (next[[i, t - 1]] - current[[i, t]]);
        }
    }

    /// Sets each corner to the mean of its two edge neighbours.
    pub(crate) fn average_corners(next: &mut Array2<f64>) {
        let (nx, ny) = next.dim();
        let (r, t) = (nx - 1, ny - 1);
        next[[0, 0]] = 0.5 * (next[[1, 0]] + next[[0, 1]]);
        next[[r, 0]] = 0.5 * (next[[r - 1, 0]] + next[[r, 1]]);
        next[[r, t]] = 0.5 * (next[[r - 1, t]] + next[[r, t - 1]]);
        next[[0, t]] = 0.5 * (next[[0, t - 1]] + next[[1, t]]);
    }
}
