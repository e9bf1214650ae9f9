use crate::error::{Error, Result};
use crate::outcome::{self, Outcome};
use crate::players::Side;
use itertools::Itertools;
use ndarray::prelude::*;
use std::fmt;

/// Row-major grid index `(i, j)`.
pub type Move = (usize, usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Mark(Side),
}

impl Cell {
    pub const EMPTY_CHAR: char = '_';

    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => Self::EMPTY_CHAR,
            Cell::Mark(side) => side.as_char(),
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            Self::EMPTY_CHAR => Some(Cell::Empty),
            'X' => Some(Cell::Mark(Side::Cross)),
            'O' => Some(Cell::Mark(Side::Nought)),
            _ => None,
        }
    }
}

/// 1-based display coordinate: column left to right, row bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    column: usize,
    row: usize,
}

impl Coord {
    pub fn new(column: i64, row: i64) -> Result<Coord> {
        if !(1..=3).contains(&column) || !(1..=3).contains(&row) {
            return Err(Error::OutOfRange { column, row });
        }
        Ok(Coord {
            column: column as usize,
            row: row as usize,
        })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn to_index(self) -> Move {
        (3 - self.row, self.column - 1)
    }

    pub fn from_index((i, j): Move) -> Coord {
        debug_assert!(i < 3 && j < 3, "grid index ({i}, {j}) outside the board");
        Coord {
            column: j + 1,
            row: 3 - i,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.column, self.row)
    }
}

/// The 3x3 grid together with its count of empty cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    empty: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array::from_elem((3, 3), Cell::Empty),
            empty: 9,
        }
    }

    pub fn cell(&self, (i, j): Move) -> Cell {
        self.cells[[i, j]]
    }

    /// Writes a cell and keeps the empty count in step with the grid.
    pub(crate) fn set_cell(&mut self, (i, j): Move, value: Cell) {
        let slot = &mut self.cells[[i, j]];
        match (*slot, value) {
            (Cell::Empty, Cell::Mark(_)) => self.empty -= 1,
            (Cell::Mark(_), Cell::Empty) => self.empty += 1,
            _ => {}
        }
        *slot = value;
    }

    pub fn cell_available(&self, coord: Coord) -> bool {
        self.cell(coord.to_index()) == Cell::Empty
    }

    pub fn apply_move(&mut self, coord: Coord, side: Side) -> Result<()> {
        if !self.cell_available(coord) {
            return Err(Error::Occupied {
                column: coord.column(),
                row: coord.row(),
            });
        }
        self.set_cell(coord.to_index(), Cell::Mark(side));
        Ok(())
    }

    pub fn count_empty(&self) -> usize {
        self.empty
    }

    pub fn count_marks(&self, side: Side) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == Cell::Mark(side))
            .count()
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Move> {
        self.cells
            .indexed_iter()
            .filter(|(_index, &value)| value == Cell::Empty)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn outcome(&self) -> Outcome {
        outcome::evaluate(self)
    }

    /// Rebuilds a board from its flattened row-major encoding and infers
    /// whose turn it is: equal counts mean X moves next.
    pub fn decode(seq: &str) -> Result<(Board, Side)> {
        let chars: Vec<char> = seq.chars().collect();
        if chars.len() != 9 {
            return Err(Error::InvalidBoardLength {
                got: chars.len(),
                context: seq.to_owned(),
            });
        }
        let mut board = Board::new();
        for (position, &character) in chars.iter().enumerate() {
            let cell = Cell::from_char(character).ok_or_else(|| Error::InvalidCellCharacter {
                character,
                position,
                context: seq.to_owned(),
            })?;
            board.set_cell((position / 3, position % 3), cell);
        }

        let x_count = board.count_marks(Side::Cross);
        let o_count = board.count_marks(Side::Nought);
        if x_count != o_count && x_count != o_count + 1 {
            return Err(Error::InvalidPieceCounts { x_count, o_count });
        }
        if outcome::winners(&board).len() > 1 {
            return Err(Error::MultipleWinners(seq.to_owned()));
        }

        let side = if x_count == o_count {
            Side::Cross
        } else {
            Side::Nought
        };
        Ok((board, side))
    }

    pub fn encode(&self) -> String {
        self.cells.iter().map(|cell| cell.as_char()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "---------")?;
        for row in self.cells.rows() {
            writeln!(f, "| {} |", row.iter().map(|cell| cell.as_char()).join(" "))?;
        }
        write!(f, "---------")
    }
}
