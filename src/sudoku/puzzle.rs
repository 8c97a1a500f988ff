//! The textual puzzle format and the [`Sudoku`] wrapper.
//!
//! A puzzle is an n×n board written as n lines of n space-separated tokens: integers
//! `1..=n` for known cells and `?` for unknown ones. The first line's token count
//! defines n, which must be a perfect square no greater than 64. A board that parses
//! but already contains a duplicate in some row, column, or block is rejected here,
//! so a successfully constructed [`Sudoku`] is always safe to hand to the search.

use crate::sudoku::board::{Board, MAX_SIDE, UNKNOWN};
use crate::sudoku::search::{self, Uniqueness};
use crate::sudoku::validator;
use itertools::Itertools;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

/// A 4×4 example puzzle with a single completion.
pub const EXAMPLE_FOUR: [[i32; 4]; 4] = [
    [1, -1, 3, -1],
    [3, 4, -1, 2],
    [-1, 1, 4, -1],
    [4, -1, -1, 1],
];

/// The classic 9×9 example puzzle.
pub const EXAMPLE_NINE: [[i32; 9]; 9] = [
    [5, 3, -1, -1, 7, -1, -1, -1, -1],
    [6, -1, -1, 1, 9, 5, -1, -1, -1],
    [-1, 9, 8, -1, -1, -1, -1, 6, -1],
    [8, -1, -1, -1, 6, -1, -1, -1, 3],
    [4, -1, -1, 8, -1, 3, -1, -1, 1],
    [7, -1, -1, -1, 2, -1, -1, -1, 6],
    [-1, 6, -1, -1, -1, -1, 2, 8, -1],
    [-1, -1, -1, 4, 1, 9, -1, -1, 5],
    [-1, -1, -1, -1, 8, -1, -1, 7, 9],
];

/// A 16×16 example puzzle; every open cell is forced by its row, column, and block.
pub const EXAMPLE_SIXTEEN: [[i32; 16]; 16] = [
    [-1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
    [5, 6, 7, 8, 9, -1, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4],
    [9, 10, 11, 12, 13, 14, 15, 16, 1, 2, -1, 4, 5, 6, 7, 8],
    [13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, -1],
    [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 1],
    [6, 7, 8, -1, 10, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5],
    [10, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
    [3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, -1, 16, 1, 2],
    [7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6],
    [11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
    [15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14],
    [4, 5, 6, 7, 8, 9, 10, -1, 12, 13, 14, 15, 16, 1, 2, 3],
    [8, 9, 10, 11, 12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7],
    [12, 13, 14, 15, 16, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [16, 1, 2, 3, 4, 5, 6, 7, 8, -1, 10, 11, 12, 13, 14, 15],
];

/// Errors produced while reading a puzzle from text.
///
/// These are the input-shape faults the parsing layer screens out before a board
/// ever reaches the engine; the engine itself assumes well-formed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input contained no tokens at all.
    Empty,
    /// The first line's token count is not a perfect square.
    NotSquare(usize),
    /// The first line's token count exceeds the supported maximum of 64.
    TooLarge(usize),
    /// Fewer rows than the side length announced by the first line.
    MissingRows {
        /// Rows required by the first line's token count.
        expected: usize,
        /// Rows actually present.
        found: usize,
    },
    /// A row with a token count different from the side length.
    RowLength {
        /// Zero-based index of the offending row.
        row: usize,
        /// Tokens required per row.
        expected: usize,
        /// Tokens actually present.
        found: usize,
    },
    /// A token that is neither an integer nor the `?` marker.
    InvalidToken {
        /// Zero-based index of the offending row.
        row: usize,
        /// The offending token.
        token: String,
    },
    /// An integer token outside `1..=n`.
    ValueOutOfRange {
        /// Zero-based index of the offending row.
        row: usize,
        /// The parsed value.
        value: i64,
        /// The board's side length.
        n: usize,
    },
    /// The parsed board already has a duplicate in a row, column, or block.
    Contradiction,
    /// The file could not be read.
    Io(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty puzzle"),
            Self::NotSquare(n) => write!(f, "side length {n} is not a perfect square"),
            Self::TooLarge(n) => write!(f, "side length {n} exceeds the maximum of {MAX_SIDE}"),
            Self::MissingRows { expected, found } => {
                write!(f, "expected {expected} rows, found {found}")
            }
            Self::RowLength {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} values, expected {expected}"),
            Self::InvalidToken { row, token } => {
                write!(f, "invalid token {token:?} in row {row}")
            }
            Self::ValueOutOfRange { row, value, n } => {
                write!(f, "value {value} in row {row} is outside 1..={n}")
            }
            Self::Contradiction => {
                write!(f, "board has a duplicate in a row, column, or block")
            }
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A validated puzzle: a board known to be free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    board: Board,
}

impl Sudoku {
    /// Wraps a board after running the feasibility precheck.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Contradiction`] if the board already has a duplicate in
    /// some row, column, or block.
    pub fn new(board: Board) -> Result<Self, ParseError> {
        if validator::is_valid_partial_board(&board) {
            Ok(Self { board })
        } else {
            Err(ParseError::Contradiction)
        }
    }

    /// The current state of the board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Consumes the puzzle, yielding the board.
    #[must_use]
    pub fn into_board(self) -> Board {
        self.board
    }

    /// Solves the puzzle by candidate-pruned backtracking, overwriting the stored
    /// board with the solution on success.
    pub fn solve_pruned(&mut self) -> bool {
        match search::solve_pruned(&self.board) {
            Some(solution) => {
                self.board = solution;
                true
            }
            None => false,
        }
    }

    /// Solves the puzzle by unpruned backtracking, overwriting the stored board with
    /// the solution on success. Eventually terminates; no practical time bound.
    pub fn solve_exhaustive(&mut self) -> bool {
        match search::solve_exhaustive(&self.board) {
            Some(solution) => {
                self.board = solution;
                true
            }
            None => false,
        }
    }

    /// Whether the puzzle has exactly one completion.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        search::is_singular(&self.board)
    }

    /// The zero/one/many completion verdict for the puzzle.
    #[must_use]
    pub fn uniqueness(&self) -> Uniqueness {
        search::uniqueness(&self.board)
    }
}

impl FromStr for Sudoku {
    type Err = ParseError;

    /// Parses the textual board format described in the module documentation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();

        let first = lines.next().ok_or(ParseError::Empty)?;
        let tokens = first.split_whitespace().collect_vec();
        let n = tokens.len();

        if n == 0 {
            return Err(ParseError::Empty);
        }
        if n.isqrt() * n.isqrt() != n {
            return Err(ParseError::NotSquare(n));
        }
        if n > MAX_SIDE {
            return Err(ParseError::TooLarge(n));
        }

        let mut board = Board::new(n);
        insert_row(&mut board, &tokens, 0)?;

        for y in 1..n {
            let line = lines.next().ok_or(ParseError::MissingRows {
                expected: n,
                found: y,
            })?;
            let tokens = line.split_whitespace().collect_vec();
            if tokens.len() != n {
                return Err(ParseError::RowLength {
                    row: y,
                    expected: n,
                    found: tokens.len(),
                });
            }
            insert_row(&mut board, &tokens, y)?;
        }

        Self::new(board)
    }
}

/// Fills row `y` of `board` from its textual tokens.
fn insert_row(board: &mut Board, tokens: &[&str], y: usize) -> Result<(), ParseError> {
    for (x, token) in tokens.iter().enumerate() {
        match token.parse::<i64>() {
            Ok(value) => {
                #[allow(clippy::cast_possible_wrap)]
                if value < 1 || value > board.n() as i64 {
                    return Err(ParseError::ValueOutOfRange {
                        row: y,
                        value,
                        n: board.n(),
                    });
                }
                #[allow(clippy::cast_possible_truncation)]
                board.set(x, y, value as i32);
            }
            Err(_) => {
                if *token == "?" {
                    board.set(x, y, UNKNOWN);
                } else {
                    return Err(ParseError::InvalidToken {
                        row: y,
                        token: (*token).to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Reads and parses a puzzle file.
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read, or any parse error the
/// content produces.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Sudoku, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io(e.to_string()))?;
    text.parse()
}

impl Display for Sudoku {
    /// Renders the board in its textual format, with `?` for unknown cells.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.board.n();
        let text = (0..n)
            .map(|y| {
                (0..n)
                    .map(|x| {
                        let v = self.board.get(x, y);
                        if v == UNKNOWN {
                            "?".to_string()
                        } else {
                            v.to_string()
                        }
                    })
                    .join(" ")
            })
            .join("\n");
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR: &str = "1 ? 3 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1";

    #[test]
    fn parses_a_well_formed_puzzle() {
        let puzzle: Sudoku = FOUR.parse().expect("well-formed");
        assert_eq!(puzzle.board().n(), 4);
        assert_eq!(puzzle.board().get(0, 0), 1);
        assert_eq!(puzzle.board().get(1, 0), UNKNOWN);
        assert_eq!(puzzle.board(), &Board::from(EXAMPLE_FOUR));
    }

    #[test]
    fn display_roundtrips_the_text_format() {
        let puzzle: Sudoku = FOUR.parse().expect("well-formed");
        assert_eq!(puzzle.to_string(), FOUR);
        let reparsed: Sudoku = puzzle.to_string().parse().expect("roundtrip");
        assert_eq!(reparsed, puzzle);
    }

    #[test]
    fn trailing_lines_are_ignored() {
        let text = format!("{FOUR}\n\n");
        let puzzle: Sudoku = text.parse().expect("trailing newlines are harmless");
        assert_eq!(puzzle.board().n(), 4);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!("".parse::<Sudoku>(), Err(ParseError::Empty));
        assert_eq!("\n\n".parse::<Sudoku>(), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_non_square_side() {
        assert_eq!(
            "1 2 3\n1 2 3\n1 2 3".parse::<Sudoku>(),
            Err(ParseError::NotSquare(3))
        );
    }

    #[test]
    fn rejects_oversized_boards() {
        let side = 81;
        let row = (0..side).map(|_| "?").join(" ");
        let text = (0..side).map(|_| row.clone()).join("\n");
        assert_eq!(text.parse::<Sudoku>(), Err(ParseError::TooLarge(side)));
    }

    #[test]
    fn rejects_missing_rows() {
        assert_eq!(
            "1 ? 3 ?\n3 4 ? 2".parse::<Sudoku>(),
            Err(ParseError::MissingRows {
                expected: 4,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_inconsistent_row_lengths() {
        assert_eq!(
            "1 ? 3 ?\n3 4 ?\n? 1 4 ?\n4 ? ? 1".parse::<Sudoku>(),
            Err(ParseError::RowLength {
                row: 1,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn rejects_invalid_tokens() {
        assert_eq!(
            "1 ? x ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1".parse::<Sudoku>(),
            Err(ParseError::InvalidToken {
                row: 0,
                token: "x".to_string()
            })
        );
    }

    #[test]
    fn rejects_values_out_of_range() {
        assert_eq!(
            "1 ? 5 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1".parse::<Sudoku>(),
            Err(ParseError::ValueOutOfRange {
                row: 0,
                value: 5,
                n: 4
            })
        );
        assert!(matches!(
            "0 ? 3 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1".parse::<Sudoku>(),
            Err(ParseError::ValueOutOfRange { value: 0, .. })
        ));
    }

    #[test]
    fn rejects_contradictory_boards() {
        assert_eq!(
            "1 ? ? 1\n? ? ? ?\n? ? ? ?\n? ? ? ?".parse::<Sudoku>(),
            Err(ParseError::Contradiction)
        );
    }

    #[test]
    fn solves_the_four_by_four_example() {
        let mut puzzle = Sudoku::new(Board::from(EXAMPLE_FOUR)).expect("feasible");
        assert!(puzzle.is_singular());
        assert!(puzzle.solve_pruned());
        assert!(validator::is_valid_board(puzzle.board()));
        assert_eq!(puzzle.board().unknown_count(), 0);
    }

    #[test]
    fn the_nine_by_nine_example_is_feasible_and_solvable() {
        let mut puzzle = Sudoku::new(Board::from(EXAMPLE_NINE)).expect("feasible");
        assert!(puzzle.solve_pruned());
        assert!(validator::is_valid_board(puzzle.board()));
        // The classic puzzle's well-known top-left corner.
        assert_eq!(puzzle.board().get(2, 0), 4);
        assert_eq!(puzzle.board().get(3, 0), 6);
    }

    #[test]
    fn the_sixteen_by_sixteen_example_solves_by_forced_cells() {
        let mut puzzle = Sudoku::new(Board::from(EXAMPLE_SIXTEEN)).expect("feasible");
        assert_eq!(puzzle.board().unknown_count(), 8);
        assert!(puzzle.solve_pruned());
        assert!(validator::is_valid_board(puzzle.board()));
        assert_eq!(puzzle.board().get(0, 0), 1);
    }

    #[test]
    fn unsolvable_puzzle_reports_failure_and_keeps_the_board() {
        let text = "? 1 2 4\n3 4 ? ?\n2 3 4 1\n4 ? ? 3";
        let mut puzzle: Sudoku = text.parse().expect("feasible");
        let before = puzzle.board().clone();
        assert!(!puzzle.solve_pruned());
        assert_eq!(puzzle.board(), &before);
        assert_eq!(puzzle.uniqueness(), Uniqueness::None);
    }
}
