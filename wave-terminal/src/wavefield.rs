use crate::error::Result;
use crate::grid::Grid;
use ndarray::Array2;

/// Temporal role of one of the three stored grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLevel {
    /// Level n+1, written during a step.
    Next,
    /// Level n.
    Current,
    /// Level n-1.
    Previous,
}

/// Field at three consecutive time levels.
///
/// The grids never move; `offset` names the slot playing `Next`, and the two
/// following slots (cyclically) play `Current` and `Previous`.
pub struct FieldState {
    slots: [Array2<f64>; 3],
    offset: usize,
}

impl FieldState {
    /// Allocates three zeroed grids of the given shape.
    pub fn new(grid: &Grid) -> Result<Self> {
        Ok(FieldState {
            slots: [
                grid.allocate_field()?,
                grid.allocate_field()?,
                grid.allocate_field()?,
            ],
            offset: 0,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.slots[0].dim()
    }

    /// Index of the slot currently holding `level`.
    pub fn slot_of(&self, level: TimeLevel) -> usize {
        let shift = match level {
            TimeLevel::Next => 0,
            TimeLevel::Current => 1,
            TimeLevel::Previous => 2,
        };
        (self.offset + shift) % 3
    }

    pub fn level(&self, level: TimeLevel) -> &Array2<f64> {
        &self.slots[self.slot_of(level)]
    }

    pub fn next(&self) -> &Array2<f64> {
        self.level(TimeLevel::Next)
    }

    pub fn current(&self) -> &Array2<f64> {
        self.level(TimeLevel::Current)
    }

    pub fn previous(&self) -> &Array2<f64> {
        self.level(TimeLevel::Previous)
    }

    pub fn level_mut(&mut self, level: TimeLevel) -> &mut Array2<f64> {
        let slot = self.slot_of(level);
        &mut self.slots[slot]
    }

    /// Borrows `(next, current, previous)` at once, only `next` writable.
    pub fn levels_mut(&mut self) -> (&mut Array2<f64>, &Array2<f64>, &Array2<f64>) {
        let [s0, s1, s2] = &mut self.slots;
        match self.offset {
            0 => (s0, &*s1, &*s2),
            1 => (s1, &*s2, &*s0),
            _ => (s2, &*s0, &*s1),
        }
    }

    /// Shifts every grid one level back in time without touching cell data:
    /// next becomes current, current becomes previous, previous is recycled as next.
    pub fn rotate(&mut self) {
        self.offset = (self.offset + 2) % 3;
    }

    /// Largest magnitude at level n.
    pub fn max_abs(&self) -> f64 {
        self.current().iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
    }

    /// Sum of squared amplitudes at level n.
    pub fn energy(&self) -> f64 {
        self.current().iter().map(|&v| v * v).sum()
    }
}
