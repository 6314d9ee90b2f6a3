use thiserror::Error;

/// Coarse category of a [`LifeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed construction input.
    Validation,
    /// Cell access outside the grid.
    Index,
    /// Failure of the background simulation loop.
    Runtime,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LifeError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} cells, got {found}")]
    CellCount { expected: usize, found: usize },
    #[error("grid identity token is empty")]
    EmptyIdentity,
    #[error("fill rate {0} is outside [0, 1]")]
    InvalidFillRate(f64),
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("step engine failed: {0}")]
    Step(String),
    #[error("simulation loop panicked")]
    LoopPanicked,
    #[error("failed to spawn simulation loop: {0}")]
    Spawn(String),
}

impl LifeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RaggedRows { .. }
            | Self::CellCount { .. }
            | Self::EmptyIdentity
            | Self::InvalidFillRate(_) => ErrorKind::Validation,
            Self::OutOfBounds { .. } => ErrorKind::Index,
            Self::Step(_) | Self::LoopPanicked | Self::Spawn(_) => ErrorKind::Runtime,
        }
    }
}
