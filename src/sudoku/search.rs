//! The backtracking search engine.
//!
//! Three related depth-first searches share one traversal skeleton: scan for the next
//! unknown cell in row-major order, branch over candidate values in ascending order,
//! recurse on a cloned board, and aggregate the verdicts coming back up. They differ
//! only in where candidates come from and what happens at a fully assigned leaf:
//!
//! 1. **Pruned** — candidates are the values not yet used in the cell's row, column,
//!    or block; the first valid leaf is accepted and returned immediately.
//! 2. **Exhaustive** — every value `1..=n` is tried at every unknown cell; leaves are
//!    rejected solely by the final validity check. Eventually terminates, with no
//!    practical time bound.
//! 3. **Singular** — pruned candidates, but the search does not stop at the first
//!    valid leaf: it decides whether there are zero, exactly one, or at least two
//!    completions, abandoning the entire remaining tree the moment a second one is
//!    confirmed.
//!
//! Rather than triplicating the recursion, the skeleton is parameterized by a
//! [`SearchPolicy`] supplying the candidate source, the leaf evaluation, and the
//! early-unwind test. Backtracking is clone-per-branch: each branch owns a private
//! copy of the board, and abandoning the copy is the rollback.
//!
//! The traversal order is an observable contract: given a fixed board and algorithm,
//! the returned solution is always the first one reachable under row-major cell order
//! and ascending value order.

use crate::sudoku::board::{Board, UNKNOWN};
use crate::sudoku::validator::{self, ValueMask};

/// Finds the first unknown cell at or after `(from_x, from_y)` in row-major order,
/// wrapping to column 0 on each subsequent row.
///
/// Returns `None` if the scan reaches the end of the board, meaning every cell is
/// assigned. Resuming from the caller's position rather than rescanning from the
/// origin keeps each recursion level's scan cost amortized linear in board size.
#[must_use]
pub fn find_next_unknown(board: &Board, from_x: usize, from_y: usize) -> Option<(usize, usize)> {
    let n = board.n();
    let mut x = from_x;
    for y in from_y..n {
        while x < n {
            if board.get(x, y) == UNKNOWN {
                return Some((x, y));
            }
            x += 1;
        }
        x = 0;
    }
    None
}

/// Counters describing one search run. Deterministic for a fixed board and policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Recursive calls made (branch nodes plus leaves).
    pub nodes: usize,
    /// Fully assigned boards reached and evaluated.
    pub leaves: usize,
    /// Candidate assignments attempted.
    pub decisions: usize,
}

/// The three-way outcome of a uniqueness search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// No completion exists.
    None,
    /// Exactly one completion exists.
    One,
    /// At least two completions exist; the search stopped counting at the second.
    Many,
}

/// Behavior plugged into the shared traversal: where branch candidates come from,
/// how a fully assigned leaf is judged, and which verdicts abandon the rest of the
/// search immediately.
pub trait SearchPolicy {
    /// The verdict propagated out of a subtree. It is also threaded *into* each
    /// subtree, so policies that aggregate across siblings (uniqueness counting)
    /// can carry state along the traversal.
    type Verdict;

    /// The values to branch on at unknown cell `(x, y)`, tried in ascending order.
    fn candidates(board: &Board, x: usize, y: usize) -> ValueMask;

    /// The verdict for a fully assigned board, given the verdict carried into it.
    fn leaf(board: &Board, carried: Self::Verdict) -> Self::Verdict;

    /// Whether `verdict` terminates the whole search: no further siblings are tried
    /// at any level once this returns true.
    fn is_final(verdict: &Self::Verdict) -> bool;
}

/// First-success search over pruned candidates.
#[derive(Debug, Clone, Copy)]
pub struct Pruned;

/// First-success search branching over every value unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct Exhaustive;

/// Uniqueness decision over pruned candidates.
#[derive(Debug, Clone, Copy)]
pub struct Singular;

impl SearchPolicy for Pruned {
    type Verdict = Option<Board>;

    fn candidates(board: &Board, x: usize, y: usize) -> ValueMask {
        validator::candidate_mask(board, x, y)
    }

    fn leaf(board: &Board, carried: Self::Verdict) -> Self::Verdict {
        // Acceptance is defined by the validator; pruning only narrows candidates.
        if validator::is_valid_board(board) {
            Some(board.clone())
        } else {
            carried
        }
    }

    fn is_final(verdict: &Self::Verdict) -> bool {
        verdict.is_some()
    }
}

impl SearchPolicy for Exhaustive {
    type Verdict = Option<Board>;

    fn candidates(board: &Board, _x: usize, _y: usize) -> ValueMask {
        ValueMask::full(board.n())
    }

    fn leaf(board: &Board, carried: Self::Verdict) -> Self::Verdict {
        if validator::is_valid_board(board) {
            Some(board.clone())
        } else {
            carried
        }
    }

    fn is_final(verdict: &Self::Verdict) -> bool {
        verdict.is_some()
    }
}

impl SearchPolicy for Singular {
    type Verdict = Uniqueness;

    fn candidates(board: &Board, x: usize, y: usize) -> ValueMask {
        validator::candidate_mask(board, x, y)
    }

    fn leaf(board: &Board, carried: Self::Verdict) -> Self::Verdict {
        if validator::is_valid_board(board) {
            match carried {
                Uniqueness::None => Uniqueness::One,
                Uniqueness::One | Uniqueness::Many => Uniqueness::Many,
            }
        } else {
            carried
        }
    }

    fn is_final(verdict: &Self::Verdict) -> bool {
        matches!(verdict, Uniqueness::Many)
    }
}

/// The shared traversal skeleton. Scans for the next unknown cell from `(from_x,
/// from_y)`, branches over the policy's candidates on a cloned board, and threads
/// the carried verdict through children and across siblings.
fn explore<P: SearchPolicy>(
    board: &Board,
    from_x: usize,
    from_y: usize,
    carried: P::Verdict,
    stats: &mut SearchStats,
) -> P::Verdict {
    stats.nodes += 1;

    let Some((x, y)) = find_next_unknown(board, from_x, from_y) else {
        stats.leaves += 1;
        return P::leaf(board, carried);
    };

    let mut verdict = carried;
    for v in P::candidates(board, x, y).values() {
        stats.decisions += 1;
        let mut branch = board.clone();
        branch.set(x, y, v);
        verdict = explore::<P>(&branch, x, y, verdict, stats);
        if P::is_final(&verdict) {
            return verdict;
        }
    }
    verdict
}

/// Solves `board` by candidate-pruned backtracking, returning the completed board.
///
/// Returns `None` when the board is infeasible (fails the partial-validity gate) or
/// when the search exhausts every branch without a valid completion — both normal
/// outcomes, not errors.
#[must_use]
pub fn solve_pruned(board: &Board) -> Option<Board> {
    solve_pruned_with_stats(board).0
}

/// [`solve_pruned`] plus the counters gathered during the run.
#[must_use]
pub fn solve_pruned_with_stats(board: &Board) -> (Option<Board>, SearchStats) {
    let mut stats = SearchStats::default();
    if !validator::is_valid_partial_board(board) {
        return (None, stats);
    }
    (explore::<Pruned>(board, 0, 0, None, &mut stats), stats)
}

/// Solves `board` by unpruned backtracking: every value is tried at every unknown
/// cell and invalid completions are rejected only at the leaves.
///
/// Produces exactly the same solution as [`solve_pruned`] when one exists, with
/// branching factor n at every unknown cell. Eventually terminates; no practical
/// time bound.
#[must_use]
pub fn solve_exhaustive(board: &Board) -> Option<Board> {
    solve_exhaustive_with_stats(board).0
}

/// [`solve_exhaustive`] plus the counters gathered during the run.
#[must_use]
pub fn solve_exhaustive_with_stats(board: &Board) -> (Option<Board>, SearchStats) {
    let mut stats = SearchStats::default();
    if !validator::is_valid_partial_board(board) {
        return (None, stats);
    }
    (explore::<Exhaustive>(board, 0, 0, None, &mut stats), stats)
}

/// Decides whether `board` has zero, one, or many completions.
///
/// Once two completions are confirmed anywhere in the tree the remaining search is
/// abandoned. An infeasible board has zero completions and is answered without
/// searching.
#[must_use]
pub fn uniqueness(board: &Board) -> Uniqueness {
    uniqueness_with_stats(board).0
}

/// [`uniqueness`] plus the counters gathered during the run.
#[must_use]
pub fn uniqueness_with_stats(board: &Board) -> (Uniqueness, SearchStats) {
    let mut stats = SearchStats::default();
    if !validator::is_valid_partial_board(board) {
        return (Uniqueness::None, stats);
    }
    (
        explore::<Singular>(board, 0, 0, Uniqueness::None, &mut stats),
        stats,
    )
}

/// Whether `board` has exactly one completion.
#[must_use]
pub fn is_singular(board: &Board) -> bool {
    uniqueness(board) == Uniqueness::One
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sudoku::board::UNKNOWN;

    fn solved_board(n: usize) -> Board {
        let mut board = Board::new(n);
        let r = board.root();
        for y in 0..n {
            for x in 0..n {
                #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                let v = ((y * r + y / r + x) % n + 1) as i32;
                board.set(x, y, v);
            }
        }
        board
    }

    #[test]
    fn finds_unknowns_in_row_major_order() {
        let mut board = Board::new(4);
        assert_eq!(find_next_unknown(&board, 0, 0), Some((0, 0)));
        board.set(0, 0, 1);
        board.set(1, 0, 2);
        assert_eq!(find_next_unknown(&board, 0, 0), Some((2, 0)));
        // Resuming past a row end wraps to column 0 of the next row.
        assert_eq!(find_next_unknown(&board, 3, 0), Some((3, 0)));
        board.set(3, 0, 4);
        assert_eq!(find_next_unknown(&board, 3, 0), Some((0, 1)));
    }

    #[test]
    fn fully_assigned_board_has_no_unknown() {
        let board = solved_board(4);
        assert_eq!(find_next_unknown(&board, 0, 0), None);
    }

    #[test]
    fn single_missing_cell_gets_its_only_candidate() {
        let solution = solved_board(4);
        let mut puzzle = solution.clone();
        puzzle.set(2, 1, UNKNOWN);
        assert_eq!(
            validator::candidate_mask(&puzzle, 2, 1).values().as_slice(),
            &[solution.get(2, 1)]
        );

        let solved = solve_pruned(&puzzle).expect("one cell open");
        assert_eq!(solved, solution);
        assert!(validator::is_valid_board(&solved));
    }

    #[test]
    fn empty_board_solves_to_lexicographically_first_completion() {
        let board = Board::new(4);
        let solved = solve_pruned(&board).expect("empty board is solvable");
        let expected = Board::from([[1, 2, 3, 4], [3, 4, 1, 2], [2, 1, 4, 3], [4, 3, 2, 1]]);
        assert_eq!(solved, expected);
    }

    #[test]
    fn empty_trivial_board_is_singular() {
        let board = Board::new(1);
        assert_eq!(solve_pruned(&board), Some(Board::from([[1]])));
        assert_eq!(uniqueness(&board), Uniqueness::One);
        assert!(is_singular(&board));
    }

    #[test]
    fn empty_board_is_solvable_but_not_singular() {
        let board = Board::new(4);
        assert!(solve_pruned(&board).is_some());
        assert_eq!(uniqueness(&board), Uniqueness::Many);
        assert!(!is_singular(&board));
    }

    #[test]
    fn solved_board_is_singular() {
        let board = solved_board(9);
        assert_eq!(solve_pruned(&board), Some(board.clone()));
        assert!(is_singular(&board));
    }

    #[test]
    fn near_complete_board_is_singular() {
        let mut board = solved_board(4);
        board.set(0, 0, UNKNOWN);
        board.set(3, 2, UNKNOWN);
        assert!(is_singular(&board));
    }

    #[test]
    fn infeasible_board_is_rejected_without_searching() {
        let mut board = Board::new(4);
        board.set(0, 0, 1);
        board.set(3, 0, 1);
        assert!(!validator::is_valid_partial_board(&board));

        let (solved, stats) = solve_pruned_with_stats(&board);
        assert_eq!(solved, None);
        assert_eq!(stats, SearchStats::default());
        assert_eq!(uniqueness(&board), Uniqueness::None);
        assert!(!is_singular(&board));
        assert_eq!(solve_exhaustive(&board), None);
    }

    #[test]
    fn feasible_but_unsolvable_board_returns_none() {
        // (0, 0) sees {1, 2, 4} in its row, {3} in its column: no candidate remains,
        // yet no line holds a duplicate.
        let board = Board::from([
            [-1, 1, 2, 4],
            [3, 4, -1, -1],
            [2, 3, 4, 1],
            [4, -1, -1, 3],
        ]);
        assert!(validator::is_valid_partial_board(&board));
        assert!(validator::candidate_mask(&board, 0, 0).is_empty());

        assert_eq!(solve_pruned(&board), None);
        assert_eq!(solve_exhaustive(&board), None);
        assert_eq!(uniqueness(&board), Uniqueness::None);
    }

    #[test]
    fn pruned_and_exhaustive_agree_on_solvable_boards() {
        let mut small = solved_board(4);
        for (x, y) in [(0, 0), (1, 0), (2, 1), (3, 2), (1, 3)] {
            small.set(x, y, UNKNOWN);
        }
        let pruned = solve_pruned(&small).expect("solvable");
        let exhaustive = solve_exhaustive(&small).expect("solvable");
        assert_eq!(pruned, exhaustive);
        assert!(validator::is_valid_board(&pruned));

        let mut nine = solved_board(9);
        for (x, y) in [(0, 0), (4, 4), (8, 8), (2, 6)] {
            nine.set(x, y, UNKNOWN);
        }
        assert_eq!(solve_pruned(&nine), solve_exhaustive(&nine));
    }

    #[test]
    fn exhaustive_explores_more_than_pruned() {
        let mut board = solved_board(4);
        for (x, y) in [(0, 0), (1, 0), (0, 1)] {
            board.set(x, y, UNKNOWN);
        }
        let (pruned, pruned_stats) = solve_pruned_with_stats(&board);
        let (exhaustive, exhaustive_stats) = solve_exhaustive_with_stats(&board);
        assert_eq!(pruned, exhaustive);
        assert!(pruned_stats.decisions <= exhaustive_stats.decisions);
        assert!(pruned_stats.nodes >= 1);
    }

    #[test]
    fn solver_is_deterministic() {
        let board = Board::new(4);
        assert_eq!(solve_pruned(&board), solve_pruned(&board));
        let (_, first) = solve_pruned_with_stats(&board);
        let (_, second) = solve_pruned_with_stats(&board);
        assert_eq!(first, second);
    }
}
