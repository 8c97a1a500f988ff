//! Command-line entry point for the Sudoku solver.
//!
//! Parses command-line arguments, dispatches to the appropriate command handler,
//! and manages the overall execution flow. The heavy lifting lives in the library's
//! `sudoku` modules; this binary only wires parsing, solving, and reporting together.
//!
//! ## Usage
//!
//! ```sh
//! # Solve a puzzle file with the default pruned search
//! sudoku-solver puzzle.sudoku
//!
//! # Solve with the unpruned search and print debug info
//! sudoku-solver solve --path puzzle.sudoku --algorithm exhaustive --debug
//!
//! # Solve a puzzle given as literal text
//! sudoku-solver text --input "1 ? 3 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1"
//!
//! # Decide whether a puzzle has zero, one, or many completions
//! sudoku-solver check --path puzzle.sudoku
//!
//! # Solve every .sudoku file under a directory
//! sudoku-solver dir --path puzzles/
//! ```

use crate::command_line::cli::{check_file, solve_dir, solve_file, solve_text, Cli, Commands};
use clap::{CommandFactory, Parser};

mod command_line;

/// Global allocator using `tikv-jemallocator` for potentially better performance
/// and memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    // A bare path without a subcommand defaults to solving that file.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            if let Err(e) = solve_file(&path, &cli.common) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            return;
        }
    }

    let result = match cli.command {
        Some(Commands::Solve { path, common }) => solve_file(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Check { path, common }) => check_file(&path, &common),
        Some(Commands::Dir { path, common }) => solve_dir(&path, &common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
