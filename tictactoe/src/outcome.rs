//! Win/draw detection for a board.

use crate::board::{Board, Cell, Move};
use crate::players::Side;
use itertools::Itertools;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    NotStarted,
    InProgress,
    CrossWins,
    NoughtWins,
    Draw,
}

impl Outcome {
    pub fn is_finished(self) -> bool {
        matches!(self, Outcome::CrossWins | Outcome::NoughtWins | Outcome::Draw)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Outcome::NotStarted => "Not started",
            Outcome::InProgress => "Game not finished",
            Outcome::CrossWins => "X wins",
            Outcome::NoughtWins => "O wins",
            Outcome::Draw => "Draw",
        };
        f.write_str(text)
    }
}

pub const WINNING_LINES: [[Move; 3]; 8] = [
    // rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Distinct sides holding at least one complete line.
pub fn winners(board: &Board) -> Vec<Side> {
    WINNING_LINES
        .iter()
        .filter_map(|&[a, b, c]| match board.cell(a) {
            Cell::Mark(side)
                if board.cell(b) == Cell::Mark(side) && board.cell(c) == Cell::Mark(side) =>
            {
                Some(side)
            }
            _ => None,
        })
        .unique()
        .collect()
}

/// Classifies a board. Two winning sides can never be reached through
/// legal play, so that case panics instead of returning an outcome.
pub fn evaluate(board: &Board) -> Outcome {
    let winners = winners(board);
    assert!(
        winners.len() <= 1,
        "board {} has more than one winner: {:?}",
        board.encode(),
        winners
    );
    match winners.first() {
        Some(side) => side.wins(),
        None if board.count_empty() == 0 => Outcome::Draw,
        None => Outcome::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(seq: &str) -> Board {
        Board::decode(seq).unwrap().0
    }

    #[test]
    fn every_single_line_is_a_win() {
        for line in WINNING_LINES {
            for side in [Side::Cross, Side::Nought] {
                let mut b = Board::new();
                for mv in line {
                    b.set_cell(mv, Cell::Mark(side));
                }
                assert_eq!(evaluate(&b), side.wins(), "line {line:?}");
            }
        }
    }

    #[test]
    fn win_on_a_full_board_beats_draw() {
        assert_eq!(evaluate(&board("XOXOXOOXX")), Outcome::CrossWins);
    }

    #[test]
    fn two_lines_of_the_same_side_is_one_winner() {
        let b = board("XXXOXOXOO");
        assert_eq!(winners(&b), vec![Side::Cross]);
        assert_eq!(evaluate(&b), Outcome::CrossWins);
    }

    #[test]
    fn nought_wins_down_a_column() {
        assert_eq!(evaluate(&board("XOX_O_XO_")), Outcome::NoughtWins);
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        assert_eq!(evaluate(&board("XOXXOOOXX")), Outcome::Draw);
    }

    #[test]
    fn open_board_without_line_is_in_progress() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
        assert_eq!(evaluate(&board("XXO_O_X_O")), Outcome::InProgress);
    }

    #[test]
    fn every_board_with_at_most_one_winner_is_classified() {
        let lines = WINNING_LINES.map(|line| line.map(|(i, j)| i * 3 + j));
        let mut checked = 0;
        for code in 0..3usize.pow(9) {
            let cells: Vec<Cell> = (0..9)
                .map(|pos| match code / 3usize.pow(pos) % 3 {
                    0 => Cell::Empty,
                    1 => Cell::Mark(Side::Cross),
                    _ => Cell::Mark(Side::Nought),
                })
                .collect();
            let mut line_owners: Vec<Side> = lines
                .iter()
                .filter_map(|&[a, b, c]| match cells[a] {
                    Cell::Mark(side) if cells[b] == cells[a] && cells[c] == cells[a] => Some(side),
                    _ => None,
                })
                .collect();
            line_owners.sort_by_key(|side| side.as_char());
            line_owners.dedup();
            if line_owners.len() > 1 {
                continue;
            }

            let mut b = Board::new();
            for (pos, cell) in cells.iter().enumerate() {
                b.set_cell((pos / 3, pos % 3), *cell);
            }
            let expected = match line_owners.first() {
                Some(side) => side.wins(),
                None if cells.contains(&Cell::Empty) => Outcome::InProgress,
                None => Outcome::Draw,
            };
            assert_eq!(evaluate(&b), expected, "board {}", b.encode());
            checked += 1;
        }
        assert!(checked > 19_000);
    }

    #[test]
    #[should_panic(expected = "more than one winner")]
    fn two_winning_sides_is_an_invariant_violation() {
        let mut b = Board::new();
        for j in 0..3 {
            b.set_cell((0, j), Cell::Mark(Side::Cross));
            b.set_cell((1, j), Cell::Mark(Side::Nought));
        }
        evaluate(&b);
    }

    #[test]
    fn outcome_text_matches_console_output() {
        assert_eq!(Outcome::InProgress.to_string(), "Game not finished");
        assert_eq!(Outcome::CrossWins.to_string(), "X wins");
        assert_eq!(Outcome::NoughtWins.to_string(), "O wins");
        assert_eq!(Outcome::Draw.to_string(), "Draw");
        assert!(!Outcome::NotStarted.is_finished());
    }
}
