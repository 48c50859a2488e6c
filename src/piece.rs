use serde::{Deserialize, Serialize};

/// One of the seven tetromino kinds.
///
/// Cell ids on the board use 1-7 in this order; 0 is an empty cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Piece {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

/// A single rotation state: rows of 0/1 cells, row 0 at the top.
///
/// Matrices are intentionally variable-sized (the I piece is 1x4 or 4x1, the
/// O piece 2x2, and so on) so a shape never carries padding cells.
pub type Shape = &'static [&'static [u8]];

impl Piece {
    pub const ALL: [Piece; 7] = [
        Piece::I,
        Piece::O,
        Piece::T,
        Piece::S,
        Piece::Z,
        Piece::J,
        Piece::L,
    ];

    /// Board cell id written when this piece locks (1-7, never 0).
    pub const fn cell_value(self) -> u8 {
        match self {
            Piece::I => 1,
            Piece::O => 2,
            Piece::T => 3,
            Piece::S => 4,
            Piece::Z => 5,
            Piece::J => 6,
            Piece::L => 7,
        }
    }

    pub fn from_cell_value(value: u8) -> Option<Piece> {
        Piece::ALL.into_iter().find(|p| p.cell_value() == value)
    }

    /// Number of distinct rotation states in this piece's rotation cycle.
    pub const fn rotation_states(self) -> usize {
        match self {
            Piece::O => 1,
            Piece::S | Piece::Z => 2,
            Piece::I | Piece::T | Piece::J | Piece::L => 4,
        }
    }

    /// The occupied-cell matrix for a rotation index (wraps past the cycle).
    pub fn shape(self, rotation: usize) -> Shape {
        let states = rotation_table(self);
        states[rotation % states.len()]
    }
}

const I_STATES: [Shape; 4] = [
    &[&[1, 1, 1, 1]],
    &[&[1], &[1], &[1], &[1]],
    &[&[1, 1, 1, 1]],
    &[&[1], &[1], &[1], &[1]],
];

const O_STATES: [Shape; 1] = [&[&[1, 1], &[1, 1]]];

const T_STATES: [Shape; 4] = [
    &[&[0, 1, 0], &[1, 1, 1]],
    &[&[1, 0], &[1, 1], &[1, 0]],
    &[&[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1], &[1, 1], &[0, 1]],
];

const S_STATES: [Shape; 2] = [&[&[0, 1, 1], &[1, 1, 0]], &[&[1, 0], &[1, 1], &[0, 1]]];

const Z_STATES: [Shape; 2] = [&[&[1, 1, 0], &[0, 1, 1]], &[&[0, 1], &[1, 1], &[1, 0]]];

const J_STATES: [Shape; 4] = [
    &[&[1, 0, 0], &[1, 1, 1]],
    &[&[1, 1], &[1, 0], &[1, 0]],
    &[&[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1], &[0, 1], &[1, 1]],
];

const L_STATES: [Shape; 4] = [
    &[&[0, 0, 1], &[1, 1, 1]],
    &[&[1, 0], &[1, 0], &[1, 1]],
    &[&[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1], &[0, 1], &[0, 1]],
];

fn rotation_table(piece: Piece) -> &'static [Shape] {
    match piece {
        Piece::I => &I_STATES,
        Piece::O => &O_STATES,
        Piece::T => &T_STATES,
        Piece::S => &S_STATES,
        Piece::Z => &Z_STATES,
        Piece::J => &J_STATES,
        Piece::L => &L_STATES,
    }
}
