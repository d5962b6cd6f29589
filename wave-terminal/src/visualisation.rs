use crate::config::{DisplayConfig, PaletteKind};
use crate::simulation::Frame;
use colorgrad::Gradient;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

/// Display bucket of a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Neutral,
    Band(usize),
}

/// Buckets `value` into one of `bands` equal slices of [-1, 1).
///
/// Values within `zero_threshold` of zero, and values that land outside the
/// palette, are neutral.
pub fn classify(value: f64, zero_threshold: f64, bands: usize) -> Shade {
    if !value.is_finite() || value.abs() < zero_threshold {
        return Shade::Neutral;
    }
    let norm = (value + 1.0) / 2.0;
    // Truncation toward zero: slightly below -1 still lands in band 0.
    let index = (norm * bands as f64).trunc();
    if index < 0.0 || index >= bands as f64 {
        Shade::Neutral
    } else {
        Shade::Band(index as usize)
    }
}

const ANSI_BANDS: [Color; 7] = [
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
];

/// Colours for each band plus the neutral colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    bands: Vec<Color>,
    neutral: Color,
}

impl Palette {
    pub fn from_config(config: &DisplayConfig) -> Self {
        match config.palette {
            PaletteKind::Ansi => Palette {
                bands: ANSI_BANDS.to_vec(),
                neutral: Color::Black,
            },
            PaletteKind::RdYlBu => {
                Self::from_gradient(&colorgrad::preset::rd_yl_bu(), config.bands)
            }
            PaletteKind::Viridis => {
                Self::from_gradient(&colorgrad::preset::viridis(), config.bands)
            }
        }
    }

    /// Samples `gradient` at the centre of each band.
    pub fn from_gradient(gradient: &dyn Gradient, bands: usize) -> Self {
        let bands = (0..bands)
            .map(|b| {
                let t = (b as f32 + 0.5) / bands as f32;
                let [r, g, b, _] = gradient.at(t).to_rgba8();
                Color::Rgb { r, g, b }
            })
            .collect();
        Palette {
            bands,
            neutral: Color::Black,
        }
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn color(&self, shade: Shade) -> Color {
        match shade {
            Shade::Band(k) => self.bands.get(k).copied().unwrap_or(self.neutral),
            Shade::Neutral => self.neutral,
        }
    }
}

/// Time budget of one frame; rates that do not map to a `Duration` disable pacing.
fn frame_interval(fps: f64) -> Duration {
    Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::ZERO)
}

/// Draws frames as a coloured character matrix, one terminal row per `i`.
pub struct TerminalRenderer<W: Write> {
    out: W,
    palette: Palette,
    glyph: char,
    zero_threshold: f64,
    frame_interval: Duration,
    last_frame: Option<Instant>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, config: &DisplayConfig) -> Self {
        Self {
            out,
            palette: Palette::from_config(config),
            glyph: config.glyph,
            zero_threshold: config.zero_threshold,
            frame_interval: frame_interval(config.fps),
            last_frame: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn draw(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let (nx, ny) = frame.field.dim();
        let bands = self.palette.len();
        let cell = format!("{} ", self.glyph);

        for i in 0..nx {
            queue!(self.out, cursor::MoveTo(0, i as u16))?;
            let mut last_color = None;
            for j in 0..ny {
                let shade = classify(frame.field[[i, j]], self.zero_threshold, bands);
                let color = self.palette.color(shade);
                if last_color != Some(color) {
                    queue!(self.out, SetForegroundColor(color))?;
                    last_color = Some(color);
                }
                queue!(self.out, Print(&cell))?;
            }
        }

        let status = format!(
            "step {}/{}  t = {:.3e} s  [q] quit",
            frame.step + 1,
            frame.n_stop,
            frame.time
        );
        queue!(
            self.out,
            ResetColor,
            cursor::MoveTo(0, nx as u16),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        self.out.flush()
    }

    /// Sleeps off whatever is left of the current frame slot.
    pub fn pace(&mut self) {
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < self.frame_interval {
                thread::sleep(self.frame_interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }

    pub fn present(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        self.draw(frame)?;
        self.pace();
        Ok(())
    }
}

/// Puts the terminal into raw mode on the alternate screen until dropped.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        if let Err(e) = terminal::enable_raw_mode() {
            let _ = execute!(out, cursor::Show, LeaveAlternateScreen);
            return Err(e);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), ResetColor, cursor::Show, LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn near_zero_values_are_neutral() {
        assert_eq!(classify(0.0, 0.05, 7), Shade::Neutral);
        assert_eq!(classify(0.049, 0.05, 7), Shade::Neutral);
        assert_eq!(classify(-0.049, 0.05, 7), Shade::Neutral);
        assert_eq!(classify(f64::NAN, 0.05, 7), Shade::Neutral);
    }

    #[test]
    fn values_fall_into_bands() {
        assert_eq!(classify(-0.99, 0.05, 7), Shade::Band(0));
        assert_eq!(classify(-0.5, 0.05, 7), Shade::Band(1));
        assert_eq!(classify(0.06, 0.05, 7), Shade::Band(3));
        assert_eq!(classify(0.99, 0.05, 7), Shade::Band(6));
    }

    #[test]
    fn out_of_range_values_are_neutral() {
        assert_eq!(classify(1.0, 0.05, 7), Shade::Neutral);
        assert_eq!(classify(2.5, 0.05, 7), Shade::Neutral);
        assert_eq!(classify(-1.5, 0.05, 7), Shade::Neutral);
        // Just below -1 still truncates into the first band.
        assert_eq!(classify(-1.1, 0.05, 7), Shade::Band(0));
    }

    #[test]
    fn ansi_palette_has_seven_colours() {
        let palette = Palette::from_config(&DisplayConfig::default());
        assert_eq!(palette.len(), 7);
        assert_eq!(palette.color(Shade::Band(0)), Color::DarkRed);
        assert_eq!(palette.color(Shade::Neutral), Color::Black);
        assert_eq!(palette.color(Shade::Band(9)), Color::Black);
    }

    #[test]
    fn gradient_palette_uses_requested_band_count() {
        let config = DisplayConfig {
            palette: PaletteKind::Viridis,
            bands: 12,
            ..DisplayConfig::default()
        };
        let palette = Palette::from_config(&config);
        assert_eq!(palette.len(), 12);
        assert!(matches!(palette.color(Shade::Band(3)), Color::Rgb { .. }));
        assert_ne!(palette.color(Shade::Band(0)), palette.color(Shade::Band(11)));
    }

    #[test]
    fn extreme_frame_rates_do_not_panic() {
        assert_eq!(frame_interval(30.0), Duration::from_secs_f64(1.0 / 30.0));
        assert_eq!(frame_interval(1e-30), Duration::ZERO);
        assert_eq!(frame_interval(-5.0), Duration::ZERO);

        let config = DisplayConfig {
            fps: 1e-30,
            ..DisplayConfig::default()
        };
        let mut renderer = TerminalRenderer::new(Vec::new(), &config);
        renderer.pace();
        renderer.pace();
    }

    #[test]
    fn draw_writes_one_glyph_per_node_and_a_status_line() {
        let mut field = Array2::<f64>::zeros((3, 4));
        field[[1, 2]] = 0.9;
        let frame = Frame {
            step: 6,
            n_stop: 150,
            time: 1.0e-15,
            field: field.view(),
        };
        let config = DisplayConfig {
            glyph: '@',
            ..DisplayConfig::default()
        };
        let mut renderer = TerminalRenderer::new(Vec::new(), &config);
        renderer.draw(&frame).unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(text.matches("@ ").count(), 12);
        assert!(text.contains("step 7/150"));
        assert!(text.contains("[q] quit"));
    }
}
