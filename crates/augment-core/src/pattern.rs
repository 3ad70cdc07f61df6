//! World coordinates of the planar reference pattern.
//!
//! Features are ordered column-major: the outer loop walks columns (`x`), the
//! inner loop walks rows (`y`). The top-left feature sits at the origin and
//! rows extend along `-Y`, so every point satisfies `y <= 0` and `z == 0`.

use serde::{Deserialize, Serialize};

use crate::{Error, Pt3, Real, Result};

/// Inner-corner grid dimensions of the reference pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSize {
    pub rows: usize,
    pub cols: usize,
}

impl Default for PatternSize {
    fn default() -> Self {
        Self { rows: 6, cols: 9 }
    }
}

impl PatternSize {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let size = Self { rows, cols };
        size.validate()?;
        Ok(size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::invalid(format!(
                "pattern size must be positive, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    pub fn point_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn world_points(&self) -> Result<Vec<Pt3>> {
        generate(self.rows, self.cols)
    }

    /// Pattern points at the four extremes, in the order
    /// top-left, top-right, bottom-left, bottom-right.
    pub fn extremal_corners(&self) -> Result<[Pt3; 4]> {
        self.validate()?;
        let right = (self.cols - 1) as Real;
        let bottom = -((self.rows - 1) as Real);
        Ok([
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(right, 0.0, 0.0),
            Pt3::new(0.0, bottom, 0.0),
            Pt3::new(right, bottom, 0.0),
        ])
    }
}

/// Generate `rows * cols` pattern points; point `i` is `(i / rows, -(i % rows), 0)`.
pub fn generate(rows: usize, cols: usize) -> Result<Vec<Pt3>> {
    PatternSize { rows, cols }.validate()?;
    let mut points = Vec::with_capacity(rows * cols);
    for x in 0..cols {
        for y in 0..rows {
            points.push(Pt3::new(x as Real, -(y as Real), 0.0));
        }
    }
    Ok(points)
}
