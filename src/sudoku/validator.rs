//! Stateless constraint checks over a [`Board`].
//!
//! All functions here are pure: they compute bit-packed sets of used values per row,
//! column, and block, and derive from them the three judgements the search engine
//! needs — full validity (a completed, correct board), partial validity (no duplicates
//! yet, unknowns allowed), and the candidate set for a single cell.
//!
//! Value sets are packed into a [`ValueMask`]: bit `v - 1` set means value `v` is
//! present (in a used-value mask) or permitted (in a candidate mask). With the side
//! length capped at 64 a single `u64` word always suffices.

use crate::sudoku::board::{Board, UNKNOWN};
use smallvec::SmallVec;

/// A bit-packed set of cell values; bit `v - 1` corresponds to value `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueMask(u64);

impl ValueMask {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set of all values `1..=n`.
    ///
    /// Computed without shifting by `n` so that `n = 64` does not overflow the word.
    #[must_use]
    pub const fn full(n: usize) -> Self {
        debug_assert!(n >= 1 && n <= 64);
        Self(u64::MAX >> (64 - n))
    }

    /// Whether value `v` is in the set. Values outside `1..=64` are never members.
    #[must_use]
    pub const fn contains(self, v: i32) -> bool {
        v >= 1 && v <= 64 && (self.0 >> (v - 1)) & 1 != 0
    }

    /// Inserts value `v` into the set.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `v` is outside `1..=64`.
    pub const fn insert(&mut self, v: i32) {
        debug_assert!(v >= 1 && v <= 64);
        self.0 |= 1 << (v - 1);
    }

    /// The number of values in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The complement of this set within the universe `1..=n`.
    #[must_use]
    pub const fn complement(self, n: usize) -> Self {
        Self(!self.0 & Self::full(n).0)
    }

    /// The union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// The member values in ascending order. Inline storage covers boards up to n = 16.
    #[must_use]
    pub fn values(self) -> SmallVec<[i32; 16]> {
        let mut out = SmallVec::new();
        let mut bits = self.0;
        while bits != 0 {
            #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
            out.push(bits.trailing_zeros() as i32 + 1);
            bits &= bits - 1;
        }
        out
    }
}

/// The block origin (top-left corner coordinate) of the line containing `coord`,
/// for blocks of side `root`.
#[must_use]
pub const fn block_origin(coord: usize, root: usize) -> usize {
    (coord / root) * root
}

/// The set of assigned values in row `y`. Duplicates accumulate silently; this mask
/// never detects them.
#[must_use]
pub fn row_mask(board: &Board, y: usize) -> ValueMask {
    let mut mask = ValueMask::EMPTY;
    for x in 0..board.n() {
        let v = board.get(x, y);
        if v != UNKNOWN {
            mask.insert(v);
        }
    }
    mask
}

/// The set of assigned values in column `x`.
#[must_use]
pub fn col_mask(board: &Board, x: usize) -> ValueMask {
    let mut mask = ValueMask::EMPTY;
    for y in 0..board.n() {
        let v = board.get(x, y);
        if v != UNKNOWN {
            mask.insert(v);
        }
    }
    mask
}

/// The set of assigned values in the √n×√n block whose top-left corner is `(bx, by)`.
///
/// `bx` and `by` must be multiples of the block side.
#[must_use]
pub fn block_mask(board: &Board, bx: usize, by: usize) -> ValueMask {
    let root = board.root();
    let mut mask = ValueMask::EMPTY;
    for y_off in 0..root {
        for x_off in 0..root {
            let v = board.get(bx + x_off, by + y_off);
            if v != UNKNOWN {
                mask.insert(v);
            }
        }
    }
    mask
}

/// Whether row `y` contains every value `1..=n` exactly once. Any unknown or duplicate
/// cell makes the row incomplete.
#[must_use]
pub fn is_complete_row(board: &Board, y: usize) -> bool {
    let mut mask = ValueMask::EMPTY;
    for x in 0..board.n() {
        let v = board.get(x, y);
        if v == UNKNOWN || mask.contains(v) {
            return false;
        }
        mask.insert(v);
    }
    mask == ValueMask::full(board.n())
}

/// Whether column `x` contains every value `1..=n` exactly once.
#[must_use]
pub fn is_complete_col(board: &Board, x: usize) -> bool {
    let mut mask = ValueMask::EMPTY;
    for y in 0..board.n() {
        let v = board.get(x, y);
        if v == UNKNOWN || mask.contains(v) {
            return false;
        }
        mask.insert(v);
    }
    mask == ValueMask::full(board.n())
}

/// Whether the block with top-left corner `(bx, by)` contains every value `1..=n`
/// exactly once.
#[must_use]
pub fn is_complete_block(board: &Board, bx: usize, by: usize) -> bool {
    let root = board.root();
    let mut mask = ValueMask::EMPTY;
    for y_off in 0..root {
        for x_off in 0..root {
            let v = board.get(bx + x_off, by + y_off);
            if v == UNKNOWN || mask.contains(v) {
                return false;
            }
            mask.insert(v);
        }
    }
    mask == ValueMask::full(board.n())
}

/// The full-solution acceptance test: every row, column, and block is complete.
#[must_use]
pub fn is_valid_board(board: &Board) -> bool {
    let n = board.n();
    let root = board.root();

    (0..n).all(|y| is_complete_row(board, y))
        && (0..n).all(|x| is_complete_col(board, x))
        && (0..root).all(|bx| (0..root).all(|by| is_complete_block(board, bx * root, by * root)))
}

/// Whether row `y` has no duplicate among its assigned values. Unknown cells are ignored.
#[must_use]
pub fn is_valid_partial_row(board: &Board, y: usize) -> bool {
    let mut mask = ValueMask::EMPTY;
    for x in 0..board.n() {
        let v = board.get(x, y);
        if v != UNKNOWN {
            if mask.contains(v) {
                return false;
            }
            mask.insert(v);
        }
    }
    true
}

/// Whether column `x` has no duplicate among its assigned values.
#[must_use]
pub fn is_valid_partial_col(board: &Board, x: usize) -> bool {
    let mut mask = ValueMask::EMPTY;
    for y in 0..board.n() {
        let v = board.get(x, y);
        if v != UNKNOWN {
            if mask.contains(v) {
                return false;
            }
            mask.insert(v);
        }
    }
    true
}

/// Whether the block with top-left corner `(bx, by)` has no duplicate among its
/// assigned values.
#[must_use]
pub fn is_valid_partial_block(board: &Board, bx: usize, by: usize) -> bool {
    let root = board.root();
    let mut mask = ValueMask::EMPTY;
    for y_off in 0..root {
        for x_off in 0..root {
            let v = board.get(bx + x_off, by + y_off);
            if v != UNKNOWN {
                if mask.contains(v) {
                    return false;
                }
                mask.insert(v);
            }
        }
    }
    true
}

/// The feasibility precheck: no row, column, or block contains a duplicate. A board
/// failing this check is provably unsolvable and must not be handed to the search.
#[must_use]
pub fn is_valid_partial_board(board: &Board) -> bool {
    let n = board.n();
    let root = board.root();

    (0..n).all(|y| is_valid_partial_row(board, y))
        && (0..n).all(|x| is_valid_partial_col(board, x))
        && (0..root)
            .all(|bx| (0..root).all(|by| is_valid_partial_block(board, bx * root, by * root)))
}

/// The set of values legally assignable at `(x, y)`: the complement, within `1..=n`,
/// of the union of the used values in the cell's row, column, and containing block.
#[must_use]
pub fn candidate_mask(board: &Board, x: usize, y: usize) -> ValueMask {
    let root = board.root();
    let used = row_mask(board, y)
        .union(col_mask(board, x))
        .union(block_mask(board, block_origin(x, root), block_origin(y, root)));
    used.complement(board.n())
}

/// Whether value `v` may be assigned at `(x, y)` without clashing with the cell's row,
/// column, or block.
#[must_use]
pub fn is_candidate_allowed(board: &Board, x: usize, y: usize, v: i32) -> bool {
    candidate_mask(board, x, y).contains(v)
}
