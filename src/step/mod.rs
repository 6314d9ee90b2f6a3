mod conway;

pub use conway::{ConwayStep, MOORE_OFFSETS};

use crate::{Grid, LifeError};

/// Rule that derives the next generation of a field.
pub trait StepEngine: Send + Sync + 'static {
    /// Compute the generation following `grid`.
    ///
    /// The result has the same dimensions and identity as `grid`; `grid`
    /// itself is left untouched.
    fn step(&self, grid: &Grid) -> Result<Grid, LifeError>;

    /// Apply [`step`](StepEngine::step) `n` times.
    fn step_n(&self, grid: &Grid, n: usize) -> Result<Grid, LifeError> {
        let mut result = grid.clone();
        for _ in 0..n {
            result = self.step(&result)?;
        }
        Ok(result)
    }
}
