use crate::board::{Board, Cell, Coord, Move};
use crate::config::WIN_POINTS;
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::strategy::StrategyTable;
use itertools::Itertools;
use log::debug;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Cross,
    Nought,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Cross => Side::Nought,
            Side::Nought => Side::Cross,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Side::Cross => 'X',
            Side::Nought => 'O',
        }
    }

    pub fn wins(self) -> Outcome {
        match self {
            Side::Cross => Outcome::CrossWins,
            Side::Nought => Outcome::NoughtWins,
        }
    }

    /// Leaf score for a win by this side; X maximises, O minimises.
    pub fn points(self) -> i32 {
        match self {
            Side::Cross => WIN_POINTS,
            Side::Nought => -WIN_POINTS,
        }
    }

    /// True when `candidate` is strictly better than `best` for this side.
    pub fn prefers(self, candidate: i32, best: i32) -> bool {
        match self {
            Side::Cross => candidate > best,
            Side::Nought => candidate < best,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    User,
    Easy,
    Medium,
    Hard,
}

impl FromStr for PlayerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(PlayerKind::User),
            "easy" => Ok(PlayerKind::Easy),
            "medium" => Ok(PlayerKind::Medium),
            "hard" => Ok(PlayerKind::Hard),
            other => Err(Error::UnknownPlayerKind(other.to_owned())),
        }
    }
}

#[derive(Debug)]
pub enum Tier {
    Easy,
    Medium,
    Hard(Arc<StrategyTable>),
}

impl Tier {
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard(_) => "hard",
        }
    }
}

#[derive(Debug)]
pub enum Player {
    Human { side: Side },
    Computer { side: Side, tier: Tier, rng: StdRng },
}

impl Player {
    /// Builds a player. `strategy` is only called for the hard tier.
    pub fn spawn<F>(side: Side, kind: PlayerKind, rng: StdRng, strategy: F) -> Player
    where
        F: FnOnce() -> Arc<StrategyTable>,
    {
        let tier = match kind {
            PlayerKind::User => return Player::Human { side },
            PlayerKind::Easy => Tier::Easy,
            PlayerKind::Medium => Tier::Medium,
            PlayerKind::Hard => Tier::Hard(strategy()),
        };
        Player::Computer { side, tier, rng }
    }

    pub fn side(&self) -> Side {
        match self {
            Player::Human { side } | Player::Computer { side, .. } => *side,
        }
    }

    /// Produces the next coordinate. Humans are prompted until they give a
    /// free cell; computer tiers always return an empty cell.
    pub fn choose_move<R: BufRead, W: Write>(
        &mut self,
        board: &Board,
        history: &[Move],
        input: &mut R,
        output: &mut W,
    ) -> Result<Coord> {
        match self {
            Player::Human { .. } => loop {
                write!(output, "Enter the coordinates: ")?;
                output.flush()?;
                let line = read_line_lossy(input)?.ok_or(Error::InputClosed)?;
                match human_move(board, &line) {
                    Ok(coord) => return Ok(coord),
                    Err(err) if err.is_recoverable() => writeln!(output, "{err}")?,
                    Err(err) => return Err(err),
                }
            },
            Player::Computer { side, tier, rng } => {
                writeln!(output, "Making move level \"{}\"", tier.name())?;
                let side = *side;
                let coord = match tier {
                    Tier::Easy => random_move(board, rng),
                    Tier::Medium => next_turn_victory(board, side)
                        .or_else(|| next_turn_victory(board, side.other()))
                        .unwrap_or_else(|| random_move(board, rng)),
                    Tier::Hard(strategy) => next_turn_victory(board, side)
                        .or_else(|| next_turn_victory(board, side.other()))
                        .unwrap_or_else(|| strategy.optimal_move(history, side)),
                };
                debug!("{} ({:?}) picked {}", tier.name(), side, coord);
                Ok(coord)
            }
        }
    }
}

/// Reads one line, replacing bytes that are not UTF-8. `None` at end of input.
pub(crate) fn read_line_lossy<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Parses one integer token. Values too large for `i64` saturate so they
/// are reported as out of range rather than as non-numbers.
fn parse_number(token: &str) -> Result<i64> {
    token.parse::<i64>().or_else(|err| match err.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(Error::NotNumeric),
    })
}

/// Splits a line into exactly two integers.
pub fn parse_coordinates(line: &str) -> Result<(i64, i64)> {
    let numbers = line
        .split_whitespace()
        .map(parse_number)
        .collect::<Result<Vec<_>>>()?;
    numbers.into_iter().collect_tuple().ok_or(Error::NotNumeric)
}

/// Parses and validates one line of human input against the board.
pub fn human_move(board: &Board, line: &str) -> Result<Coord> {
    let (column, row) = parse_coordinates(line)?;
    let coord = Coord::new(column, row)?;
    if !board.cell_available(coord) {
        return Err(Error::Occupied {
            column: coord.column(),
            row: coord.row(),
        });
    }
    Ok(coord)
}

fn random_move(board: &Board, rng: &mut StdRng) -> Coord {
    let mv = board
        .empty_cells()
        .choose(rng)
        .copied()
        .expect("computer player asked to move on a full board");
    Coord::from_index(mv)
}

/// First empty cell, in row-major order, where `side` completes a line.
pub fn next_turn_victory(board: &Board, side: Side) -> Option<Coord> {
    let mut scratch = board.clone();
    for mv in board.empty_cells() {
        scratch.set_cell(mv, Cell::Mark(side));
        let won = scratch.outcome() == side.wins();
        scratch.set_cell(mv, Cell::Empty);
        if won {
            return Some(Coord::from_index(mv));
        }
    }
    None
}
