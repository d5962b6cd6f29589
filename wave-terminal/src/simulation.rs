use crate::config::PhysicalConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::solver::FieldSolver;
use crate::source::GaussianPulse;
use crate::wavefield::FieldState;
use log::{debug, info};
use ndarray::ArrayView2;
use std::ops::ControlFlow;

/// Quantities derived once from a [`PhysicalConfig`].
///
/// Fields are private: `dt` only ever comes from the 2D Courant limit
/// `dt = 1 / (c * sqrt(1/dx² + 1/dy²))`, which keeps the scheme stable.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    grid: Grid,
    dt: f64,
    courant_x: f64,
    courant_y: f64,
    wave_speed: f64,
    n_stop: usize,
    source_node: (usize, usize),
    pulse: GaussianPulse,
}

impl SimulationParameters {
    pub fn derive(config: &PhysicalConfig) -> Result<Self> {
        config.validate()?;

        let grid = config.grid();
        let c = config.wave_speed;
        let dt = Self::stable_dt(c, grid.dx, grid.dy);

        Ok(Self {
            grid,
            dt,
            courant_x: c * dt / grid.dx,
            courant_y: c * dt / grid.dy,
            wave_speed: c,
            n_stop: config.n_stop,
            source_node: config.source,
            pulse: GaussianPulse::new(
                config.wavelength,
                config.pulse_width,
                config.time_offset,
                c,
            ),
        })
    }

    /// Largest stable time step for the 2D leapfrog scheme.
    pub fn stable_dt(wave_speed: f64, dx: f64, dy: f64) -> f64 {
        1.0 / (wave_speed * (1.0 / (dx * dx) + 1.0 / (dy * dy)).sqrt())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn courant_x(&self) -> f64 {
        self.courant_x
    }

    pub fn courant_y(&self) -> f64 {
        self.courant_y
    }

    pub fn wave_speed(&self) -> f64 {
        self.wave_speed
    }

    pub fn n_stop(&self) -> usize {
        self.n_stop
    }

    pub fn source_node(&self) -> (usize, usize) {
        self.source_node
    }

    pub fn pulse(&self) -> &GaussianPulse {
        &self.pulse
    }

    pub fn time_at(&self, n: usize) -> f64 {
        n as f64 * self.dt
    }

    /// Value forced onto the source node during step `n`.
    pub fn source_value(&self, n: usize) -> f64 {
        self.pulse.value_at(self.time_at(n))
    }

    pub fn total_time(&self) -> f64 {
        self.time_at(self.n_stop)
    }
}

/// A completed time level handed to the renderer.
pub struct Frame<'a> {
    pub step: usize,
    pub n_stop: usize,
    pub time: f64,
    pub field: ArrayView2<'a, f64>,
}

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps_completed: usize,
    pub cancelled: bool,
    pub peak_amplitude: f64,
}

pub struct Simulation {
    solver: FieldSolver,
    state: FieldState,
    current_step: usize,
    peak_amplitude: f64,
}

impl Simulation {
    /// Derives the parameters and allocates the three field levels.
    pub fn new(config: &PhysicalConfig) -> Result<Self> {
        let params = SimulationParameters::derive(config)?;
        let state = FieldState::new(params.grid())?;
        Ok(Self {
            solver: FieldSolver::new(params),
            state,
            current_step: 0,
            peak_amplitude: 0.0,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        self.solver.params()
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_time(&self) -> f64 {
        self.params().time_at(self.current_step)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.params().n_stop()
    }

    /// Runs one step: solve, hand the new level to `on_frame`, rotate.
    ///
    /// Returns `None` once the configured step count has been reached.
    pub fn advance<E, F>(&mut self, on_frame: F) -> Option<std::result::Result<ControlFlow<()>, E>>
    where
        F: FnOnce(Frame<'_>) -> std::result::Result<ControlFlow<()>, E>,
    {
        if self.is_finished() {
            return None;
        }
        let n = self.current_step;
        self.solver.step(&mut self.state, n);

        let flow = on_frame(Frame {
            step: n,
            n_stop: self.params().n_stop(),
            time: self.params().time_at(n),
            field: self.state.next().view(),
        });

        self.solver.rotate(&mut self.state);
        self.current_step += 1;

        let amplitude = self.state.max_abs();
        self.peak_amplitude = self.peak_amplitude.max(amplitude);
        debug!(
            "step {} max |u| = {:.4e}, sum u² = {:.4e}",
            n,
            amplitude,
            self.state.energy()
        );

        Some(flow)
    }

    /// Steps until `n_stop` or until `on_frame` breaks.
    pub fn run<E, F>(&mut self, mut on_frame: F) -> std::result::Result<RunSummary, E>
    where
        F: FnMut(Frame<'_>) -> std::result::Result<ControlFlow<()>, E>,
    {
        let mut cancelled = false;
        while let Some(flow) = self.advance(&mut on_frame) {
            if flow?.is_break() {
                cancelled = !self.is_finished();
                break;
            }
        }

        let summary = RunSummary {
            steps_completed: self.current_step,
            cancelled,
            peak_amplitude: self.peak_amplitude,
        };
        if summary.cancelled {
            info!(
                "Simulation stopped early at step {}/{}",
                summary.steps_completed,
                self.params().n_stop()
            );
        } else {
            info!(
                "Simulation complete after {} steps (t = {:.3e} s)",
                summary.steps_completed,
                self.current_time()
            );
        }
        Ok(summary)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let params = self.params();
        let grid = params.grid();
        let pulse = params.pulse();
        println!("=== Wave Simulation ===");
        println!(
            "Grid: {}x{} nodes ({:.3e} x {:.3e} m, dx={:.3e} m, dy={:.3e} m)",
            grid.nx,
            grid.ny,
            grid.width(),
            grid.height(),
            grid.dx,
            grid.dy
        );
        println!(
            "Time step: {:.6e} s, Courant numbers Ox={:.4}, Oy={:.4}",
            params.dt(),
            params.courant_x(),
            params.courant_y()
        );
        println!(
            "Steps: {} (total {:.3e} s)",
            params.n_stop(),
            params.total_time()
        );
        let (xs, ys) = params.source_node();
        println!(
            "Source: node ({}, {}), wavelength={:.3e} m, width={:.3e} s, T0={:.3e} s",
            xs, ys, pulse.wavelength, pulse.width, pulse.time_offset
        );
        println!("=======================");
    }
}
