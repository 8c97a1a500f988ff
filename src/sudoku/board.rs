//! The board: a mutable square matrix of cell values with an "unknown" marker.
//!
//! A `Board` is pure data plus accessors. It knows nothing about Sudoku constraints;
//! the `validator` module interprets its contents. Cloning a board yields a fully
//! independent deep copy, which is what the search engine's backtracking-by-cloning
//! relies on.

use itertools::Itertools;
use std::fmt::Display;

/// Marker stored in a cell whose value has not been determined.
pub const UNKNOWN: i32 = -1;

/// Largest supported side length, dictated by the 64-bit value masks in `validator`.
pub const MAX_SIDE: usize = 64;

/// A square n×n grid of cell values.
///
/// Every stored value is either [`UNKNOWN`] or in `1..=n`. The side length is fixed at
/// construction and only changes through [`Board::resize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<i32>,
    n: usize,
}

impl Board {
    /// Creates an n×n board with every cell set to [`UNKNOWN`].
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero, not a perfect square, or greater than [`MAX_SIDE`].
    #[must_use]
    pub fn new(n: usize) -> Self {
        assert!(
            n >= 1 && n <= MAX_SIDE && n.isqrt() * n.isqrt() == n,
            "board side must be a perfect square in 1..={MAX_SIDE}, got {n}"
        );
        Self {
            cells: vec![UNKNOWN; n * n],
            n,
        }
    }

    /// The side length of the board.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// The block side length √n.
    #[must_use]
    pub const fn root(&self) -> usize {
        self.n.isqrt()
    }

    /// Returns the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) out of range for n = {}", self.n);
        self.cells[y * self.n + x]
    }

    /// Stores `value` at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range, or if `value` is neither [`UNKNOWN`] nor
    /// in `1..=n`.
    pub fn set(&mut self, x: usize, y: usize, value: i32) {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) out of range for n = {}", self.n);
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let n = self.n as i32;
        assert!(
            value == UNKNOWN || (1..=n).contains(&value),
            "value {value} out of range for n = {n}"
        );
        self.cells[y * self.n + x] = value;
    }

    /// Reinitializes the board to an n×n grid of [`UNKNOWN`] cells.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero, not a perfect square, or greater than [`MAX_SIDE`].
    pub fn resize(&mut self, n: usize) {
        *self = Self::new(n);
    }

    /// The number of cells still set to [`UNKNOWN`].
    #[must_use]
    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == UNKNOWN).count()
    }

    /// Whether every cell holds an assigned value.
    #[must_use]
    pub fn is_fully_assigned(&self) -> bool {
        self.cells.iter().all(|&v| v != UNKNOWN)
    }
}

impl<const N: usize> From<[[i32; N]; N]> for Board {
    /// Builds a board from an N×N array of rows, `rows[y][x]` holding the value at `(x, y)`.
    fn from(rows: [[i32; N]; N]) -> Self {
        let mut board = Self::new(N);
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                board.set(x, y, value);
            }
        }
        board
    }
}

impl Display for Board {
    /// Rows separated by newlines, values by single spaces. Unknown cells print as `-1`;
    /// the puzzle layer substitutes the `?` marker.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .cells
            .chunks(self.n)
            .map(|row| row.iter().join(" "))
            .join("\n");
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_all_unknown() {
        let board = Board::new(9);
        assert_eq!(board.n(), 9);
        assert_eq!(board.root(), 3);
        assert_eq!(board.unknown_count(), 81);
        assert!(!board.is_fully_assigned());
        assert_eq!(board.get(8, 8), UNKNOWN);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut board = Board::new(4);
        board.set(2, 3, 4);
        assert_eq!(board.get(2, 3), 4);
        board.set(2, 3, UNKNOWN);
        assert_eq!(board.get(2, 3), UNKNOWN);
    }

    #[test]
    fn clones_are_independent() {
        let mut original = Board::new(4);
        original.set(0, 0, 1);
        let mut copy = original.clone();
        copy.set(0, 0, 2);
        assert_eq!(original.get(0, 0), 1);
        assert_eq!(copy.get(0, 0), 2);
    }

    #[test]
    fn resize_clears_all_cells() {
        let mut board = Board::new(4);
        board.set(1, 1, 3);
        board.resize(4);
        assert_eq!(board.get(1, 1), UNKNOWN);
        board.resize(9);
        assert_eq!(board.n(), 9);
        assert_eq!(board.unknown_count(), 81);
    }

    #[test]
    fn from_rows_is_row_major() {
        // x indexes the column, y the row
        let board =
            Board::from([[1, -1, 3, -1], [3, 4, -1, 2], [-1, 1, 4, -1], [4, -1, -1, 1]]);
        assert_eq!(board.get(0, 0), 1);
        assert_eq!(board.get(2, 0), 3);
        assert_eq!(board.get(1, 2), 1);
        assert_eq!(board.get(3, 3), 1);
    }

    #[test]
    fn displays_rows_with_raw_markers() {
        let mut board = Board::new(1);
        assert_eq!(board.to_string(), "-1");
        board.set(0, 0, 1);
        assert_eq!(board.to_string(), "1");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_bounds_panics() {
        let board = Board::new(4);
        let _ = board.get(4, 0);
    }

    #[test]
    #[should_panic(expected = "value 5 out of range")]
    fn set_bad_value_panics() {
        let mut board = Board::new(4);
        board.set(0, 0, 5);
    }

    #[test]
    #[should_panic(expected = "perfect square")]
    fn non_square_side_panics() {
        let _ = Board::new(5);
    }

    #[test]
    fn maximum_side_is_accepted() {
        let board = Board::new(64);
        assert_eq!(board.unknown_count(), 64 * 64);
    }
}
