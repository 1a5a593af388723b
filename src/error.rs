use crate::grid::Pos;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeError {
    /// Grid dimensions must both be at least 1.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },

    /// Wave labeling claimed the target was reached, but walking the labels
    /// back hit a cell with no neighbor holding the next lower step.
    #[error("no neighbor labeled {expected} next to {at:?} while walking the path back")]
    BrokenPath { at: Pos, expected: u32 },
}
