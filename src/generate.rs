use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::MazeError;
use crate::grid::{Cell, Grid, Pos};

/// Generates a maze with binary-tree carving and stamps two exits.
///
/// Every cell at an odd row and odd column becomes a room. Scanning rooms
/// top-to-bottom, left-to-right, each room knocks out at most one wall,
/// toward its up or right neighbor room chosen uniformly; rooms with neither
/// neighbor carve nothing and root the carved tree. The result is a spanning
/// tree over the rooms.
///
/// With `random_exit` the two exits are placed independently: a uniformly
/// random row, any column on a boundary row, otherwise one of the two side
/// columns. The two picks may land on the same cell, in which case the grid
/// ends up with a single exit and solving reports the wrong exit count.
/// Without it, the exits sit at `(0, 1)` and `(rows - 1, cols - 2)`.
///
/// An exit is only stamped onto a wall; a cell the carving already opened is
/// left as it is.
pub fn generate(
    rows: usize,
    cols: usize,
    random_exit: bool,
    rng: &mut impl Rng,
) -> Result<Grid, MazeError> {
    let mut grid = Grid::new(rows, cols)?;

    for row in (1..rows).step_by(2) {
        for col in (1..cols).step_by(2) {
            grid.set(Pos { row, col }, Cell::Open);
        }
    }

    for row in (1..rows).step_by(2) {
        for col in (1..cols).step_by(2) {
            let mut walls = Vec::with_capacity(2);
            if row >= 3 {
                walls.push(Pos { row: row - 1, col });
            }
            if col + 2 < cols {
                walls.push(Pos { row, col: col + 1 });
            }
            if let Some(&wall) = walls.choose(rng) {
                grid.remove_wall(wall);
            }
        }
    }

    let targets = if random_exit {
        vec![
            random_exit_pos(rows, cols, rng),
            random_exit_pos(rows, cols, rng),
        ]
    } else {
        fixed_exits(rows, cols)
    };
    for pos in &targets {
        stamp_exit(&mut grid, *pos);
    }

    debug!(
        "generated {}x{} maze, exit stamps at {:?}",
        rows, cols, targets
    );
    Ok(grid)
}

fn random_exit_pos(rows: usize, cols: usize, rng: &mut impl Rng) -> Pos {
    let row = rng.gen_range(0..rows);
    let col = if row == 0 || row == rows - 1 {
        rng.gen_range(0..cols)
    } else {
        // an interior row forces a side exit
        *[0, cols - 1].choose(rng).unwrap()
    };
    Pos { row, col }
}

fn fixed_exits(rows: usize, cols: usize) -> Vec<Pos> {
    if cols < 2 {
        // nowhere to put the fixed pair on a single-column grid
        return Vec::new();
    }
    vec![
        Pos { row: 0, col: 1 },
        Pos {
            row: rows - 1,
            col: cols - 2,
        },
    ]
}

fn stamp_exit(grid: &mut Grid, pos: Pos) {
    if grid.contains(pos) && grid.get(pos) == Cell::Wall {
        grid.set(pos, Cell::Exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rooms(grid: &Grid) -> Vec<Pos> {
        let mut rooms = Vec::new();
        for row in (1..grid.rows()).step_by(2) {
            for col in (1..grid.cols()).step_by(2) {
                rooms.push(Pos { row, col });
            }
        }
        rooms
    }

    // Open wall cells lying between two horizontally or vertically adjacent
    // rooms, i.e. the carved links.
    fn carved_links(grid: &Grid) -> usize {
        let mut links = 0;
        for row in (1..grid.rows()).step_by(2) {
            for col in (1..grid.cols()).step_by(2) {
                if col + 2 < grid.cols()
                    && grid.get(Pos { row, col: col + 1 }) == Cell::Open
                {
                    links += 1;
                }
                if row + 2 < grid.rows()
                    && grid.get(Pos { row: row + 1, col }) == Cell::Open
                {
                    links += 1;
                }
            }
        }
        links
    }

    fn reachable_rooms(grid: &Grid, start: Pos) -> usize {
        let mut seen = vec![start];
        let mut queue = vec![start];
        while let Some(pos) = queue.pop() {
            let sides = [
                (pos.row, pos.col + 1, pos.row, pos.col + 2),
                (pos.row + 1, pos.col, pos.row + 2, pos.col),
            ];
            let mut neighbors = Vec::new();
            for (wr, wc, nr, nc) in sides {
                if nr < grid.rows() && nc < grid.cols() {
                    neighbors.push((Pos { row: wr, col: wc }, Pos { row: nr, col: nc }));
                }
            }
            if pos.col >= 2 {
                neighbors.push((
                    Pos { row: pos.row, col: pos.col - 1 },
                    Pos { row: pos.row, col: pos.col - 2 },
                ));
            }
            if pos.row >= 2 {
                neighbors.push((
                    Pos { row: pos.row - 1, col: pos.col },
                    Pos { row: pos.row - 2, col: pos.col },
                ));
            }
            for (wall, room) in neighbors {
                if grid.get(wall) == Cell::Open && !seen.contains(&room) {
                    seen.push(room);
                    queue.push(room);
                }
            }
        }
        seen.len()
    }

    #[test]
    fn rooms_are_open_after_generation() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generate(15, 15, false, &mut rng).unwrap();
        for pos in rooms(&grid) {
            assert_eq!(grid.get(pos), Cell::Open);
        }
    }

    #[test]
    fn carving_is_a_spanning_tree_over_rooms() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(15, 15, false, &mut rng).unwrap();
            let rooms = rooms(&grid);
            // only the top-right room lacks both an up and a right neighbor
            assert_eq!(carved_links(&grid), rooms.len() - 1);
            assert_eq!(reachable_rooms(&grid, rooms[0]), rooms.len());
        }
    }

    #[test]
    fn spanning_tree_holds_for_odd_shapes() {
        for (rows, cols) in [(3, 15), (15, 3), (9, 5), (2, 9), (9, 2)] {
            let mut rng = StdRng::seed_from_u64(11);
            let grid = generate(rows, cols, false, &mut rng).unwrap();
            let rooms = rooms(&grid);
            if rooms.is_empty() {
                continue;
            }
            assert_eq!(carved_links(&grid), rooms.len() - 1);
            assert_eq!(reachable_rooms(&grid, rooms[0]), rooms.len());
        }
    }

    #[test]
    fn fixed_mode_places_the_standard_exits() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = generate(15, 15, false, &mut rng).unwrap();
        assert_eq!(
            grid.exits(),
            vec![Pos { row: 0, col: 1 }, Pos { row: 14, col: 13 }]
        );
    }

    #[test]
    fn random_mode_exits_sit_on_the_boundary() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(15, 15, true, &mut rng).unwrap();
            let exits = grid.exits();
            // the two stamps may coincide, leaving a single exit
            assert!(!exits.is_empty() && exits.len() <= 2);
            for exit in exits {
                assert!(
                    exit.row == 0 || exit.row == 14 || exit.col == 0 || exit.col == 14,
                    "exit {:?} not on the boundary",
                    exit
                );
            }
        }
    }

    #[test]
    fn one_by_one_grid_stays_walled() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = generate(1, 1, false, &mut rng).unwrap();
        assert_eq!(grid.get(Pos { row: 0, col: 0 }), Cell::Wall);
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(5);
        for (rows, cols) in [(1, 1), (1, 2), (2, 1), (1, 9), (9, 1), (2, 2)] {
            generate(rows, cols, false, &mut rng).unwrap();
            generate(rows, cols, true, &mut rng).unwrap();
        }
    }

    #[test]
    fn zero_sizes_are_invalid() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            generate(0, 15, false, &mut rng),
            Err(MazeError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn exits_never_overwrite_carved_cells() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate(15, 15, true, &mut rng).unwrap();
            for pos in rooms(&grid) {
                assert_ne!(grid.get(pos), Cell::Exit);
            }
        }
    }
}
