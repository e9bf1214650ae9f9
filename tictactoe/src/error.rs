//! Error types for the tic-tac-toe crate

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Bad parameters")]
    BadParameters,

    #[error("Bad parameters")]
    UnknownPlayerKind(String),

    #[error("You should enter numbers!")]
    NotNumeric,

    #[error("Coordinates should be from 1 to 3!")]
    OutOfRange { column: i64, row: i64 },

    #[error("This cell is occupied! Choose another one!")]
    Occupied { column: usize, row: usize },

    #[error("board encoding must have 9 cells, got {got} in '{context}'")]
    InvalidBoardLength { got: usize, context: String },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("board '{0}' has more than one winner")]
    MultipleWinners(String),

    #[error("input closed")]
    InputClosed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// User-input errors are reported and the prompt repeats.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::BadParameters
                | Error::UnknownPlayerKind(_)
                | Error::NotNumeric
                | Error::OutOfRange { .. }
                | Error::Occupied { .. }
                | Error::InvalidBoardLength { .. }
                | Error::InvalidCellCharacter { .. }
                | Error::InvalidPieceCounts { .. }
                | Error::MultipleWinners(_)
        )
    }
}
