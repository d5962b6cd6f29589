use crate::error::{Result, SimError};
use ndarray::Array2;

/// Uniform mesh geometry shared by all three time levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub nx: usize, // Number of nodes in x direction
    pub ny: usize, // Number of nodes in y direction
    pub dx: f64,   // Node spacing in x (meters)
    pub dy: f64,   // Node spacing in y (meters)
}

impl Grid {
    pub fn new(nx: usize, ny: usize, dx: f64, dy: f64) -> Self {
        Grid { nx, ny, dx, dy }
    }

    /// Builds the mesh covering `lx` by `ly` with nodes on both end faces,
    /// so `nx = floor(lx / dx) + 1`.
    pub fn from_domain(lx: f64, ly: f64, dx: f64, dy: f64) -> Self {
        let nx = (lx / dx).floor() as usize + 1;
        let ny = (ly / dy).floor() as usize + 1;
        Grid { nx, ny, dx, dy }
    }

    pub fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.ny
    }

    pub fn width(&self) -> f64 {
        (self.nx - 1) as f64 * self.dx
    }

    pub fn height(&self) -> f64 {
        (self.ny - 1) as f64 * self.dy
    }

    /// Allocates one zeroed field of this grid's shape.
    ///
    /// The backing buffer is reserved fallibly so an oversized mesh surfaces
    /// as [`SimError::Allocation`] instead of aborting the process.
    pub fn allocate_field(&self) -> Result<Array2<f64>> {
        let (nx, ny) = (self.nx, self.ny);
        let len = nx
            .checked_mul(ny)
            .ok_or(SimError::GridTooLarge { nx, ny })?;

        let mut data: Vec<f64> = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|source| SimError::Allocation { nx, ny, source })?;
        data.resize(len, 0.0);

        Ok(Array2::from_shape_vec((nx, ny), data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn node_count_includes_both_faces() {
        let grid = Grid::from_domain(10e-6, 10e-6, 0.12e-6, 0.12e-6);
        assert_eq!(grid.nx, 84);
        assert_eq!(grid.ny, 84);

        let exact = Grid::from_domain(1.0, 2.0, 0.25, 0.5);
        assert_eq!((exact.nx, exact.ny), (5, 5));
        assert_relative_eq!(exact.width(), 1.0);
        assert_relative_eq!(exact.height(), 2.0);
    }

    #[test]
    fn allocated_field_is_zero() {
        let grid = Grid::new(7, 3, 1.0, 1.0);
        let field = grid.allocate_field().unwrap();
        assert_eq!(field.dim(), (7, 3));
        assert!(field.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let grid = Grid::new(usize::MAX, 2, 1.0, 1.0);
        assert!(matches!(
            grid.allocate_field(),
            Err(SimError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn unreservable_grid_reports_allocation_failure() {
        let grid = Grid::new(usize::MAX / 8, 1, 1.0, 1.0);
        assert!(matches!(
            grid.allocate_field(),
            Err(SimError::Allocation { .. })
        ));
    }
}
