//! Wall and connectivity model
//!
//! Each cell stores the set of sides that are walled, using the same
//! `North=1, East=2, South=4, West=8` bits as [`DirectionSet`]. The outer
//! edge of the grid is always walled. Interior walls are kept symmetric:
//! every carve and toggle updates both cells sharing the wall.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use babyrobot_core::{Cell, Direction, DirectionSet};

/// Per-cell walls of a grid level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallSet {
    width: usize,
    height: usize,
    cells: Vec<DirectionSet>,
}

impl WallSet {
    /// A grid with walls only along its outer edge
    #[must_use]
    pub fn open(width: usize, height: usize) -> Self {
        let mut cells = vec![DirectionSet::STAY; width * height];
        for y in 0..height {
            for x in 0..width {
                let cell = &mut cells[y * width + x];
                if y == 0 {
                    *cell = cell.with(Direction::North);
                }
                if x + 1 == width {
                    *cell = cell.with(Direction::East);
                }
                if y + 1 == height {
                    *cell = cell.with(Direction::South);
                }
                if x == 0 {
                    *cell = cell.with(Direction::West);
                }
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// A perfect maze carved by randomized depth-first search from `start`.
    ///
    /// Every cell for which `excluded` returns false is reachable from
    /// `start` along exactly one path. Excluded cells stay fully walled.
    #[must_use]
    pub fn maze(
        width: usize,
        height: usize,
        start: Cell,
        seed: u64,
        excluded: impl Fn(Cell) -> bool,
    ) -> Self {
        let mut walls = Self {
            width,
            height,
            cells: vec![DirectionSet::ALL; width * height],
        };
        if !start.within(width, height) || excluded(start) {
            return walls;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut visited = vec![false; width * height];
        let mut stack = vec![start];
        visited[start.index(width)] = true;

        while let Some(&cell) = stack.last() {
            let candidates: Vec<(Direction, Cell)> =
                [Direction::West, Direction::East, Direction::South, Direction::North]
                    .into_iter()
                    .filter_map(|direction| {
                        let next = walls.neighbour(cell, direction)?;
                        let free = !visited[next.index(width)] && !excluded(next);
                        free.then_some((direction, next))
                    })
                    .collect();

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let (direction, next) = candidates[rng.gen_range(0..candidates.len())];
            walls.set_wall(cell, direction, false);
            visited[next.index(width)] = true;
            stack.push(next);
        }

        walls
    }

    /// Grid width
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The in-bounds neighbour of `cell` in `direction`
    #[must_use]
    pub fn neighbour(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        cell.step(direction)
            .filter(|next| next.within(self.width, self.height))
    }

    /// Walled sides of `cell`; cells outside the grid are fully walled
    #[must_use]
    pub fn walls_at(&self, cell: Cell) -> DirectionSet {
        if cell.within(self.width, self.height) {
            self.cells[cell.index(self.width)]
        } else {
            DirectionSet::ALL
        }
    }

    /// Whether `cell` has a wall on its `direction` side
    #[must_use]
    pub fn has_wall(&self, cell: Cell, direction: Direction) -> bool {
        self.walls_at(cell).contains(direction)
    }

    /// Sides of `cell` that can be passed through
    #[must_use]
    pub fn open_directions(&self, cell: Cell) -> DirectionSet {
        !self.walls_at(cell)
    }

    /// Flip the wall between `cell` and its neighbour in `direction`.
    ///
    /// Returns false, leaving the walls untouched, when either cell is
    /// off the grid.
    pub fn toggle(&mut self, cell: Cell, direction: Direction) -> bool {
        if !cell.within(self.width, self.height) {
            return false;
        }
        if self.neighbour(cell, direction).is_none() {
            return false;
        }
        let walled = self.has_wall(cell, direction);
        self.set_wall(cell, direction, !walled);
        true
    }

    /// Toggle the same side of `run` consecutive cells, moving down the
    /// grid for east and west walls and across it for north and south
    /// walls. Stops at the grid edge; returns the number of walls toggled.
    pub fn toggle_run(&mut self, cell: Cell, direction: Direction, run: usize) -> usize {
        let advance = match direction {
            Direction::East | Direction::West => Direction::South,
            Direction::North | Direction::South => Direction::East,
        };

        let mut toggled = 0;
        let mut current = Some(cell);
        for _ in 0..run {
            let Some(cell) = current.filter(|c| c.within(self.width, self.height)) else {
                break;
            };
            if self.toggle(cell, direction) {
                toggled += 1;
            }
            current = cell.step(advance);
        }
        toggled
    }

    fn set_wall(&mut self, cell: Cell, direction: Direction, walled: bool) {
        let Some(next) = self.neighbour(cell, direction) else {
            return;
        };
        let (a, b) = (cell.index(self.width), next.index(self.width));
        if walled {
            self.cells[a] = self.cells[a].with(direction);
            self.cells[b] = self.cells[b].with(direction.opposite());
        } else {
            self.cells[a] = self.cells[a].without(direction);
            self.cells[b] = self.cells[b].without(direction.opposite());
        }
    }
}
