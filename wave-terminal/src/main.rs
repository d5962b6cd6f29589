//! Terminal front end: runs the compiled-in optical pulse and draws each step.
//!
//! ```sh
//! wave-terminal
//! wave-terminal --display display.toml --fps 60
//! wave-terminal --headless
//! wave-terminal --print-params
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};
use std::io;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use wave_terminal::visualisation::{TerminalRenderer, TerminalSession};
use wave_terminal::{DisplayConfig, PhysicalConfig, Simulation};

#[derive(Parser)]
#[command(name = "wave-terminal")]
#[command(about = "2D wave equation FDTD simulation rendered in the terminal")]
#[command(version)]
struct Cli {
    /// TOML file with renderer settings (fps, zero_threshold, palette, bands, glyph).
    #[arg(short, long)]
    display: Option<PathBuf>,
    /// Frame rate override.
    #[arg(long)]
    fps: Option<f64>,
    /// Step the simulation without drawing.
    #[arg(long)]
    headless: bool,
    /// Print the derived parameters and the physical setup as TOML, then exit.
    #[arg(long)]
    print_params: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let physical = PhysicalConfig::OPTICAL_PULSE;
    let mut sim = Simulation::new(&physical).context("Failed to set up simulation")?;

    if cli.print_params {
        sim.print_summary();
        println!("{}", toml::to_string_pretty(&physical)?);
        return Ok(());
    }

    let mut display = match &cli.display {
        Some(path) => DisplayConfig::from_file(path)?,
        None => DisplayConfig::default(),
    };
    if let Some(fps) = cli.fps {
        display.fps = fps;
        display.validate()?;
    }
    if display.fps > 240.0 {
        warn!("Frame rate {} fps is above what most terminals can draw", display.fps);
    }

    let grid = sim.params().grid();
    info!(
        "Grid {}x{}, dt = {:.4e} s, {} steps",
        grid.nx,
        grid.ny,
        sim.params().dt(),
        sim.params().n_stop()
    );

    let started = Instant::now();
    let summary = if cli.headless {
        sim.run(|_| Ok::<_, anyhow::Error>(ControlFlow::Continue(())))?
    } else {
        let _session = TerminalSession::enter().context("Failed to prepare terminal")?;
        let mut renderer = TerminalRenderer::new(io::stdout(), &display);
        sim.run(|frame| -> Result<ControlFlow<()>> {
            renderer.present(&frame)?;
            Ok(if quit_requested()? {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })?
    };

    info!(
        "{} of {} steps in {:.2?}, peak |u| = {:.4}",
        summary.steps_completed,
        sim.params().n_stop(),
        started.elapsed(),
        summary.peak_amplitude
    );
    if summary.cancelled {
        println!("Stopped at step {}.", summary.steps_completed);
    }
    Ok(())
}

/// Drains pending key events; `q`, `Esc` or `Ctrl-C` ask to stop.
fn quit_requested() -> io::Result<bool> {
    let mut quit = false;
    while event::poll(Duration::ZERO)? {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            quit |= matches!(code, KeyCode::Char('q') | KeyCode::Esc)
                || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL));
        }
    }
    Ok(quit)
}
