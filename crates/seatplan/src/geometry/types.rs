use crate::constants::{COLS_A, COLS_B, FRONT_ROW, ROWS_A, ROWS_B, SEAT_COUNT, SIDES};
use strum_macros::{Display, EnumIter};

/// Room arrangement of the same 12 banks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Layout {
    /// 4 rows x 3 banks
    A,
    /// 3 rows x 4 banks
    B,
}

impl Layout {
    pub const fn rows(self) -> usize {
        match self {
            Layout::A => ROWS_A,
            Layout::B => ROWS_B,
        }
    }

    pub const fn cols(self) -> usize {
        match self {
            Layout::A => COLS_A,
            Layout::B => COLS_B,
        }
    }

    pub const fn front_row(self) -> usize {
        FRONT_ROW
    }

    pub const fn back_row(self) -> usize {
        self.rows() - 1
    }
}

/// Position inside a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Two-seat furniture unit, addressed by row and column of one layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BankId {
    pub row: usize,
    pub col: usize,
}

impl BankId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Seat in one layout; row 0 is the front of the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Seat {
    pub row: usize,
    pub col: usize,
    pub side: Side,
}

impl Seat {
    pub fn new(row: usize, col: usize, side: Side) -> Self {
        Self { row, col, side }
    }

    pub fn bank(&self) -> BankId {
        BankId::new(self.row, self.col)
    }

    /// The other seat of the same bank
    pub fn buddy(&self) -> Seat {
        Seat::new(self.row, self.col, self.side.other())
    }

    /// Dense index of a layout A seat, `0..SEAT_COUNT`.
    ///
    /// Buddy seats differ only in the lowest bit.
    pub fn index(&self) -> usize {
        (self.row * COLS_A + self.col) * SIDES + self.side.index()
    }

    /// Index of the buddy seat of `index`
    pub const fn buddy_index(index: usize) -> usize {
        index ^ 1
    }

    /// Inverse of [`Seat::index`]
    pub fn from_index(index: usize) -> Seat {
        debug_assert!(index < SEAT_COUNT);
        let side = if index % SIDES == 0 {
            Side::Left
        } else {
            Side::Right
        };
        let bank = index / SIDES;
        Seat::new(bank / COLS_A, bank % COLS_A, side)
    }
}
