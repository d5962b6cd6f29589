use crate::error::SimError;
use crate::grid::Grid;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Physical setup of the run. Compiled in; the binary never reads it from disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConfig {
    pub lx: f64,          // Domain length in x (m)
    pub ly: f64,          // Domain length in y (m)
    pub dx: f64,          // Node spacing in x (m)
    pub dy: f64,          // Node spacing in y (m)
    pub wavelength: f64,  // Source carrier wavelength (m)
    pub pulse_width: f64, // Source envelope width (s)
    pub time_offset: f64, // Source envelope peak time (s)
    pub wave_speed: f64,  // Propagation speed (m/s)
    pub n_stop: usize,    // Number of time steps
    pub source: (usize, usize),
}

impl PhysicalConfig {
    /// Optical pulse in a 10 µm square of vacuum.
    pub const OPTICAL_PULSE: PhysicalConfig = PhysicalConfig {
        lx: 10e-6,
        ly: 10e-6,
        dx: 0.12e-6,
        dy: 0.12e-6,
        wavelength: 1.0e-6,
        pulse_width: 18.0e-15,
        time_offset: 4.0e-15,
        wave_speed: 299_792_458.0,
        n_stop: 150,
        source: (50, 50),
    };

    pub fn grid(&self) -> Grid {
        Grid::from_domain(self.lx, self.ly, self.dx, self.dy)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("lx", self.lx),
            ("ly", self.ly),
            ("dx", self.dx),
            ("dy", self.dy),
            ("wavelength", self.wavelength),
            ("pulse_width", self.pulse_width),
            ("wave_speed", self.wave_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !self.time_offset.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "time_offset must be finite, got {}",
                self.time_offset
            )));
        }
        if self.n_stop == 0 {
            return Err(SimError::InvalidConfig("n_stop must be at least 1".into()));
        }

        let grid = self.grid();
        if grid.nx < 3 || grid.ny < 3 {
            return Err(SimError::InvalidConfig(format!(
                "grid needs at least 3x3 nodes for an interior, got {}x{}",
                grid.nx, grid.ny
            )));
        }
        let (xs, ys) = self.source;
        if !grid.in_bounds(xs, ys) {
            return Err(SimError::InvalidConfig(format!(
                "source node ({}, {}) is outside grid bounds ({}, {})",
                xs, ys, grid.nx, grid.ny
            )));
        }
        Ok(())
    }
}

impl Default for PhysicalConfig {
    fn default() -> Self {
        Self::OPTICAL_PULSE
    }
}

/// Colour scheme used by the terminal renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    /// Seven basic ANSI colours, neutral black.
    Ansi,
    RdYlBu,
    Viridis,
}

/// Renderer settings, optionally loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_zero_threshold")]
    pub zero_threshold: f64,
    #[serde(default = "default_palette")]
    pub palette: PaletteKind,
    #[serde(default = "default_bands")]
    pub bands: usize,
    #[serde(default = "default_glyph")]
    pub glyph: char,
}

fn default_fps() -> f64 {
    30.0
}

fn default_zero_threshold() -> f64 {
    0.05
}

fn default_palette() -> PaletteKind {
    PaletteKind::Ansi
}

fn default_bands() -> usize {
    7
}

fn default_glyph() -> char {
    '*'
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            zero_threshold: default_zero_threshold(),
            palette: default_palette(),
            bands: default_bands(),
            glyph: default_glyph(),
        }
    }
}

impl DisplayConfig {
    /// Load display settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read display config '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DisplayConfig =
            toml::from_str(content).context("Failed to parse display config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.1..=1000.0).contains(&self.fps) {
            return Err(anyhow!("fps must be in 0.1..=1000, got {}", self.fps));
        }
        if !(self.zero_threshold.is_finite() && self.zero_threshold >= 0.0) {
            return Err(anyhow!(
                "zero_threshold must be non-negative, got {}",
                self.zero_threshold
            ));
        }
        if !(2..=64).contains(&self.bands) {
            return Err(anyhow!("bands must be in 2..=64, got {}", self.bands));
        }
        if self.palette == PaletteKind::Ansi && self.bands != 7 {
            return Err(anyhow!(
                "the ansi palette has exactly 7 bands, got {}",
                self.bands
            ));
        }
        if self.glyph.is_control() {
            return Err(anyhow!("glyph must be printable, got {:?}", self.glyph));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optical_pulse_is_valid() {
        let config = PhysicalConfig::default();
        config.validate().unwrap();
        let grid = config.grid();
        assert_eq!((grid.nx, grid.ny), (84, 84));
    }

    #[test]
    fn rejects_source_outside_grid() {
        let config = PhysicalConfig {
            source: (84, 10),
            ..PhysicalConfig::OPTICAL_PULSE
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("outside grid bounds"));
    }

    #[test]
    fn rejects_degenerate_values() {
        let zero_spacing = PhysicalConfig {
            dx: 0.0,
            ..PhysicalConfig::OPTICAL_PULSE
        };
        assert!(zero_spacing.validate().is_err());

        let no_steps = PhysicalConfig {
            n_stop: 0,
            ..PhysicalConfig::OPTICAL_PULSE
        };
        assert!(no_steps.validate().is_err());

        let too_small = PhysicalConfig {
            lx: 0.1e-6,
            source: (0, 0),
            ..PhysicalConfig::OPTICAL_PULSE
        };
        assert!(too_small.validate().is_err());
    }

    #[test]
    fn display_defaults_fill_missing_keys() {
        let config = DisplayConfig::from_toml("fps = 60.0\n").unwrap();
        assert_eq!(config.fps, 60.0);
        assert_eq!(config.zero_threshold, 0.05);
        assert_eq!(config.palette, PaletteKind::Ansi);
        assert_eq!(config.bands, 7);
        assert_eq!(config.glyph, '*');
    }

    #[test]
    fn display_gradient_palette_parses() {
        let config =
            DisplayConfig::from_toml("palette = \"rd_yl_bu\"\nbands = 12\nglyph = \"#\"\n")
                .unwrap();
        assert_eq!(config.palette, PaletteKind::RdYlBu);
        assert_eq!(config.bands, 12);
        assert_eq!(config.glyph, '#');
    }

    #[test]
    fn display_rejects_bad_values() {
        assert!(DisplayConfig::from_toml("fps = 0.0\n").is_err());
        assert!(DisplayConfig::from_toml("fps = 1e-30\n").is_err());
        assert!(DisplayConfig::from_toml("fps = 1e9\n").is_err());
        assert!(DisplayConfig::from_toml("fps = nan\n").is_err());
        assert!(DisplayConfig::from_toml("bands = 5\n").is_err());
        assert!(DisplayConfig::from_toml("palette = \"plasma\"\n").is_err());
    }

    #[test]
    fn physical_config_dumps_as_toml() {
        let text = toml::to_string(&PhysicalConfig::OPTICAL_PULSE).unwrap();
        assert!(text.contains("n_stop = 150"));
    }
}
