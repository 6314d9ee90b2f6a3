use super::StepEngine;
use crate::{Grid, LifeError};

/// `(dx, dy)` of the eight neighbours, row above first.
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Conway's rule (B3/S23) on a bounded field: cells past the edge are dead.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConwayStep;

impl ConwayStep {
    fn count_neibs(grid: &Grid, x: usize, y: usize) -> usize {
        MOORE_OFFSETS
            .iter()
            .filter(|&&(dx, dy)| {
                match (x.checked_add_signed(dx), y.checked_add_signed(dy)) {
                    (Some(nx), Some(ny)) if nx < grid.width() && ny < grid.height() => {
                        grid.cell(nx, ny)
                    }
                    _ => false,
                }
            })
            .count()
    }
}

impl StepEngine for ConwayStep {
    fn step(&self, grid: &Grid) -> Result<Grid, LifeError> {
        let mut next = grid.clone();
        let width = grid.width();
        for (i, cell) in next.cells_mut().iter_mut().enumerate() {
            let (x, y) = (i % width, i / width);
            let neibs = Self::count_neibs(grid, x, y);
            *cell = if grid.cell(x, y) {
                neibs == 2 || neibs == 3
            } else {
                neibs == 3
            };
        }
        Ok(next)
    }
}
