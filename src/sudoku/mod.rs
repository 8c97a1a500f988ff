#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Core engine for Sudoku-family puzzles.
//!
//! The modules are layered leaves-first: `board` is pure data with accessors and no
//! constraint knowledge, `validator` evaluates row/column/block constraints over a board
//! via bit-packed value sets, `search` runs the backtracking engine on top of both, and
//! `puzzle` wraps everything in the textual board format consumed by the command line.

pub mod board;
pub mod puzzle;
pub mod search;
pub mod validator;
