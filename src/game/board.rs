use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::render::{render_grid, TokenSet};
use crate::error::SetupError;

pub const DEFAULT_ROWS: usize = 6;
pub const DEFAULT_COLS: usize = 7;

/// Number of aligned markers needed to win.
pub const RUN_LENGTH: usize = 4;

/// Column selectors are single digits, so boards cannot be wider than this.
pub const MAX_COLS: usize = 9;
pub const MAX_ROWS: usize = 64;

/// Direction vectors as (row delta, col delta). Each axis appears in both senses.
const DIRECTIONS: [(isize, isize); 8] = [
    // rows
    (0, -1),
    (0, 1),
    // cols
    (-1, 0),
    (1, 0),
    // diagonals
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Player1,
    Player2,
    Obstacle,
}

impl Cell {
    /// The player owning this cell, if any. Obstacles belong to nobody.
    pub fn owner(self) -> Option<PlayerId> {
        match self {
            Cell::Player1 => Some(PlayerId::One),
            Cell::Player2 => Some(PlayerId::Two),
            Cell::Empty | Cell::Obstacle => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropError {
    ColumnFull,
    InvalidColumn,
}

/// A `cols × rows` grid stored row-major. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(cols: usize, rows: usize) -> Result<Self, SetupError> {
        Self::check_dimensions(cols, rows)?;
        Ok(Board {
            cols,
            rows,
            cells: vec![Cell::Empty; cols * rows],
        })
    }

    /// Accepts `1..=MAX_COLS` columns and `1..=MAX_ROWS` rows.
    pub fn check_dimensions(cols: usize, rows: usize) -> Result<(), SetupError> {
        if (1..=MAX_COLS).contains(&cols) && (1..=MAX_ROWS).contains(&rows) {
            Ok(())
        } else {
            Err(SetupError::InvalidDimensions { cols, rows })
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row `rows - 1` is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Signed lookup; `None` when off the board.
    fn get_signed(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(self.get(row as usize, col as usize))
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.cols + col] = cell;
    }

    /// Iterate over the grid one row at a time, top row first.
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// Permanently block a cell. Overwrites whatever was there.
    pub(crate) fn place_obstacle(&mut self, row: usize, col: usize) {
        self.set(row, col, Cell::Obstacle);
    }

    /// Place `count` obstacles at uniformly random coordinates. Collisions are
    /// allowed, so fewer than `count` distinct cells may end up blocked.
    pub(crate) fn scatter_obstacles<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            let col = rng.random_range(0..self.cols);
            let row = rng.random_range(0..self.rows);
            self.place_obstacle(row, col);
        }
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= self.cols {
            return true;
        }
        !self.get(0, col).is_empty()
    }

    /// Row a piece dropped in `col` would land on: directly above the highest
    /// occupied cell, or the bottom row when the column is empty.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if self.is_column_full(col) {
            return None;
        }
        let first_occupied = (0..self.rows)
            .find(|&row| !self.get(row, col).is_empty())
            .unwrap_or(self.rows);
        Some(first_occupied - 1)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, DropError> {
        if col >= self.cols {
            return Err(DropError::InvalidColumn);
        }

        let row = self.landing_row(col).ok_or(DropError::ColumnFull)?;
        self.set(row, col, cell);
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| self.is_column_full(col))
    }

    /// Number of cells holding a player's marker.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| c.owner().is_some()).count()
    }

    /// Number of obstacle cells.
    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Obstacle).count()
    }

    /// Check if the piece at (row, col) is part of a winning run.
    ///
    /// Only looks at lines through the given cell, which is enough after a
    /// drop when the board had no winner before it.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell.owner().is_none() {
            return false;
        }

        // Opposite senses are paired: (0, -1)/(0, 1), (-1, 0)/(1, 0), ...
        DIRECTIONS.chunks(2).any(|axis| {
            let count = 1
                + self.count_from(row, col, axis[0], cell)
                + self.count_from(row, col, axis[1], cell);
            count >= RUN_LENGTH
        })
    }

    /// Count consecutive `cell` markers after (row, col) along `dir`.
    fn count_from(&self, row: usize, col: usize, dir: (isize, isize), cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dir.0;
        let mut c = col as isize + dir.1;
        while self.get_signed(r, c) == Some(cell) {
            count += 1;
            r += dir.0;
            c += dir.1;
        }
        count
    }

    /// Scan the whole board for a run of four. Returns the owner of the first
    /// run found, scanning rows top to bottom.
    pub fn find_win(&self) -> Option<PlayerId> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.starts_run(row, col) {
                    return self.get(row, col).owner();
                }
            }
        }
        None
    }

    fn starts_run(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell.owner().is_none() {
            return false;
        }
        DIRECTIONS.iter().any(|&(dr, dc)| {
            (1..RUN_LENGTH as isize).all(|step| {
                self.get_signed(row as isize + step * dr, col as isize + step * dc) == Some(cell)
            })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Board {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            cells: vec![Cell::Empty; DEFAULT_COLS * DEFAULT_ROWS],
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_grid(self, &TokenSet::ascii()))
    }
}
