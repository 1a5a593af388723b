use log::{debug, error};

use crate::error::MazeError;
use crate::grid::{Cell, Dir, Grid, Pos};

/// Solver output: the wave-labeled grid plus what the wave found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub labeled: Grid,
    pub outcome: Outcome,
}

impl Solution {
    /// The origin-to-target path, if one was found.
    pub fn path(&self) -> Option<&[Pos]> {
        match &self.outcome {
            Outcome::Path(path) => Some(path),
            Outcome::NoPath(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Path(Vec<Pos>),
    NoPath(Blocked),
}

/// Why no path exists. A blocked maze is a normal result, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocked {
    /// The grid does not hold exactly two exits.
    ExitCount(usize),
    /// An exit has walls on every in-bounds side; no wave was run.
    Encircled(Pos),
    /// The wave filled everything reachable without touching the far exit.
    Exhausted,
}

/// Solves a maze with breadth-first wave propagation from the first exit (in
/// row-major scan order) toward the second.
///
/// The input grid is never touched; labeling happens on a copy. The layer
/// being expanded is always read from the previous step's buffer, so every
/// cell gets the label of the first wave front that reaches it. Solving the
/// same grid twice gives identical results.
pub fn solve(grid: &Grid) -> Result<Solution, MazeError> {
    let exits = grid.exits();
    if exits.len() != 2 {
        return Ok(Solution {
            labeled: grid.clone(),
            outcome: Outcome::NoPath(Blocked::ExitCount(exits.len())),
        });
    }
    for &exit in &exits {
        if encircled(grid, exit) {
            return Ok(Solution {
                labeled: grid.clone(),
                outcome: Outcome::NoPath(Blocked::Encircled(exit)),
            });
        }
    }

    let (origin, target) = (exits[0], exits[1]);
    let mut front = grid.clone();
    front.set(origin, Cell::Step(1));
    let mut back = front.clone();

    let mut step = 1;
    loop {
        let mut spread = false;
        for row in 0..front.rows() {
            for col in 0..front.cols() {
                let pos = Pos { row, col };
                if front.get(pos) != Cell::Step(step) {
                    continue;
                }
                for dir in Dir::SCAN {
                    if let Some(next) = front.step(pos, dir) {
                        if front.get(next).passable() {
                            back.set(next, Cell::Step(step + 1));
                            spread = true;
                        }
                    }
                }
            }
        }

        if let Some(label) = back.get(target).label() {
            debug!("wave reached {:?} with label {}", target, label);
            let outcome = match backtrack(&back, target, label)? {
                Some(path) => Outcome::Path(path),
                None => Outcome::NoPath(Blocked::Exhausted),
            };
            return Ok(Solution {
                labeled: back,
                outcome,
            });
        }
        if !spread {
            debug!("wave exhausted after {} steps", step);
            return Ok(Solution {
                labeled: back,
                outcome: Outcome::NoPath(Blocked::Exhausted),
            });
        }

        front.clone_from(&back);
        step += 1;
    }
}

/// True when every in-bounds neighbor is a wall. The grid edge does not count
/// as a wall, so a corner exit needs only one open side to escape this check.
fn encircled(grid: &Grid, pos: Pos) -> bool {
    Dir::SCAN
        .iter()
        .filter_map(|&dir| grid.step(pos, dir))
        .all(|next| grid.get(next) == Cell::Wall)
}

/// Walks the labels downward from the target and returns the path in
/// origin-to-target order. A walk that never leaves the target yields `None`;
/// a missing lower label is an invariant violation and comes back as an
/// error, never as a truncated path.
fn backtrack(labeled: &Grid, target: Pos, label: u32) -> Result<Option<Vec<Pos>>, MazeError> {
    let mut path = vec![target];
    let mut pos = target;
    let mut current = label;

    while current > 1 {
        let down = Dir::SCAN
            .iter()
            .filter_map(|&dir| labeled.step(pos, dir))
            .find(|&next| labeled.get(next) == Cell::Step(current - 1));
        match down {
            Some(next) => {
                path.push(next);
                pos = next;
                current -= 1;
            }
            None => {
                error!("backtrack stuck at {:?}, no label {}", pos, current - 1);
                return Err(MazeError::BrokenPath {
                    at: pos,
                    expected: current - 1,
                });
            }
        }
    }

    path.reverse();
    if path.len() > 1 {
        Ok(Some(path))
    } else {
        Ok(None)
    }
}
