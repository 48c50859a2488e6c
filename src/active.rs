use serde::{Deserialize, Serialize};

use crate::board::{BOARD_WIDTH, Board};
use crate::piece::{Piece, Shape};

/// The falling piece: kind, rotation index, and top-left anchor in board
/// coordinates. `y` may be negative while part of the piece is still above
/// the visible area.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePiece {
    pub piece: Piece,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Fresh piece at the spawn position: rotation 0, horizontally centered,
    /// anchored to the top row.
    pub fn spawn(piece: Piece) -> Self {
        Self {
            piece,
            rotation: 0,
            x: (BOARD_WIDTH / 2) as i32 - 1,
            y: 0,
        }
    }

    pub fn shape(&self) -> Shape {
        self.piece.shape(self.rotation)
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape().iter().enumerate().flat_map(move |(row, cols)| {
            cols.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != 0)
                .map(move |(col, _)| (self.x + col as i32, self.y + row as i32))
        })
    }

    /// The same piece shifted by an offset. Candidate poses are built with
    /// this and committed only if they pass `collides`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// The next rotation state in this piece's cycle, wrapping.
    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.piece.rotation_states(),
            ..*self
        }
    }

    /// Collision test per the board's occupancy rules: out of bounds on the
    /// sides or bottom fails, overlap with a filled cell fails, cells above
    /// the top edge are exempt from the occupancy check.
    pub fn collides(&self, board: &Board) -> bool {
        self.cells().any(|(x, y)| board.is_occupied(x, y))
    }
}
