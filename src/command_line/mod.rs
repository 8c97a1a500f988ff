//! Command-line layer: argument definitions and the solve/check/report plumbing.

pub(crate) mod cli;
