use serde::{Deserialize, Serialize};

use crate::active::ActivePiece;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

pub const CELL_EMPTY: u8 = 0;

/// The playfield grid. Row 0 is the top row; cells hold 0 for empty or a
/// piece cell id (1-7).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Vec<u8>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: vec![vec![CELL_EMPTY; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: u8) {
        if y < BOARD_HEIGHT && x < BOARD_WIDTH {
            self.rows[y][x] = value;
        }
    }

    /// Whether a board cell is filled. Side and bottom bounds always count
    /// as occupied, including above the top edge; rows above the visible
    /// area (y < 0) in a valid column read as unoccupied, since pieces may
    /// straddle the top edge while spawning or rotating.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i32 {
            return true;
        }
        if y < 0 {
            return false;
        }
        if y >= BOARD_HEIGHT as i32 {
            return true;
        }
        self.rows[y as usize][x as usize] != CELL_EMPTY
    }

    /// Write the active piece's cells into the grid. Cells above row 0 are
    /// skipped; everything else is expected to be in bounds because the
    /// caller only locks non-colliding pieces.
    pub fn place(&mut self, piece: &ActivePiece) {
        let value = piece.piece.cell_value();
        for (x, y) in piece.cells() {
            if y >= 0 && y < BOARD_HEIGHT as i32 && x >= 0 && x < BOARD_WIDTH as i32 {
                self.rows[y as usize][x as usize] = value;
            }
        }
    }

    /// Row indices where every column is filled, top to bottom. Pure query.
    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT)
            .filter(|&y| self.rows[y].iter().all(|&cell| cell != CELL_EMPTY))
            .collect()
    }

    /// Remove the given rows and insert as many empty rows at the top,
    /// preserving the relative order of the surviving rows. Indices are
    /// processed highest-first so earlier removals never shift later ones.
    pub fn remove_rows(&mut self, mut row_indices: Vec<usize>) {
        row_indices.sort_unstable_by(|a, b| b.cmp(a));
        row_indices.dedup();
        for y in row_indices {
            if y >= BOARD_HEIGHT {
                continue;
            }
            self.rows.remove(y);
            self.rows.insert(0, vec![CELL_EMPTY; BOARD_WIDTH]);
        }
    }
}
