//! Binary-tree maze generation and wave (Lee) solving over a cell grid.

pub mod error;
pub mod generate;
pub mod grid;
pub mod solve;

pub use error::MazeError;
pub use generate::generate;
pub use grid::{Cell, Dir, Grid, Pos};
pub use solve::{solve, Blocked, Outcome, Solution};
