mod id;

pub use id::GridId;

use crate::{Config, LifeError};

/// Rectangular field of alive/dead cells.
///
/// `x` indexes columns and `y` indexes rows. The size is fixed at
/// construction. Cloning copies the cells and keeps the identity token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    id: GridId,
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create a field of dead cells.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            id: GridId::new(),
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a field from rows of cells; `rows[y][x]` is the cell at `(x, y)`.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, LifeError> {
        Self::from_parts(GridId::new(), rows)
    }

    /// Build a field with a known identity, e.g. one restored from disk.
    pub fn from_parts(id: GridId, rows: Vec<Vec<bool>>) -> Result<Self, LifeError> {
        if id.is_nil() {
            return Err(LifeError::EmptyIdentity);
        }
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(LifeError::RaggedRows {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        Ok(Self {
            id,
            width,
            height,
            cells,
        })
    }

    /// Build a field from row-major cells.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, LifeError> {
        if cells.len() != width * height {
            return Err(LifeError::CellCount {
                expected: width * height,
                found: cells.len(),
            });
        }
        Ok(Self {
            id: GridId::new(),
            width,
            height,
            cells,
        })
    }

    /// Create a field with random cells
    ///
    /// `seed` - random seed (if `None`, then random seed is generated)
    ///
    /// `fill_rate` - probability of a cell being alive
    pub fn random(
        width: usize,
        height: usize,
        seed: Option<u64>,
        fill_rate: f64,
    ) -> Result<Self, LifeError> {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        if !(0.0..=1.0).contains(&fill_rate) {
            return Err(LifeError::InvalidFillRate(fill_rate));
        }
        let mut rng = if let Some(x) = seed {
            ChaCha8Rng::seed_from_u64(x)
        } else {
            ChaCha8Rng::from_entropy()
        };
        let cells = (0..width * height)
            .map(|_| rng.gen_bool(fill_rate))
            .collect();
        Self::from_cells(width, height, cells)
    }

    /// Same cells under a new identity, i.e. a wholesale replacement.
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: GridId::new(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `true` when the field has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: usize, y: usize) -> Result<bool, LifeError> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) -> Result<(), LifeError> {
        let i = self.index(x, y)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Unchecked read for callers that already bounded `x` and `y`.
    pub(crate) fn cell(&self, x: usize, y: usize) -> bool {
        self.cells[x + y * self.width]
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, LifeError> {
        if x < self.width && y < self.height {
            Ok(x + y * self.width)
        } else {
            Err(LifeError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::blank(Config::DEFAULT_WIDTH, Config::DEFAULT_HEIGHT)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width.max(1)).take(self.height) {
            for &cell in row {
                write!(f, "{}", if cell { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
