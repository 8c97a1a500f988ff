#![deny(missing_docs)]
//! This crate provides a constraint-satisfaction engine for square grid puzzles of the
//! Sudoku family: boards of side length n (a perfect square up to 64) whose rows, columns,
//! and √n×√n blocks must each contain every value 1..=n exactly once.

/// The `sudoku` module contains the board representation, the constraint validator, the
/// backtracking search engine, and the textual puzzle format.
pub mod sudoku;
