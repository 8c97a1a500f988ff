#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use sudoku_solver::sudoku::board::Board;
use sudoku_solver::sudoku::puzzle::{self, Sudoku};
use sudoku_solver::sudoku::search::{self, SearchStats, Uniqueness};
use sudoku_solver::sudoku::validator;
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the Sudoku solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "sudoku-solver", version, about = "A Sudoku-family puzzle solver")]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand,
    /// it's treated as the path to a puzzle file to solve.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `solve`, `text`, `check`, `dir`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands for the solver.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a puzzle file.
    Solve {
        /// Path to the puzzle file: n lines of n space-separated tokens,
        /// integers for known cells and `?` for unknown ones.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a puzzle provided as plain text.
    Text {
        /// Literal puzzle input as a string (e.g. "1 ? 3 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1").
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Decide whether a puzzle file has zero, one, or many completions.
    Check {
        /// Path to the puzzle file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every puzzle file in a directory.
    Dir {
        /// Path to the directory containing `.sudoku` files.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output, providing more verbose logging during the solving process.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enable verification of the found solution. If a solution is found, it's checked
    /// against the row, column, and block constraints.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Enable printing of performance and problem statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Enable printing of the solved board if the puzzle is solvable.
    #[arg(short, long, default_value_t = true)]
    pub(crate) print_solution: bool,

    /// Specifies the search algorithm to use.
    /// "pruned" restricts each cell to its allowed candidates; "exhaustive" tries
    /// every value and rejects only at complete boards.
    #[arg(long, default_value_t = Algorithm::Pruned)]
    pub(crate) algorithm: Algorithm,
}

/// The backtracking variants selectable from the command line.
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Algorithm {
    /// Candidate-pruned backtracking.
    #[default]
    Pruned,
    /// Unpruned backtracking over all values.
    Exhaustive,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pruned => write!(f, "pruned"),
            Self::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

/// Parses and solves a puzzle file, reporting results.
///
/// # Errors
///
/// If the file cannot be read or parsed.
pub(crate) fn solve_file(path: &PathBuf, common: &CommonOptions) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Puzzle file does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = std::time::Instant::now();
    let sudoku = puzzle::parse_file(path).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    solve_and_report(&sudoku, common, Some(path), parse_time);
    Ok(())
}

/// Parses and solves a puzzle given as literal text, reporting results.
///
/// # Errors
///
/// If the text does not parse.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<(), String> {
    let time = std::time::Instant::now();
    let sudoku: Sudoku = input.parse().map_err(|e: puzzle::ParseError| e.to_string())?;
    let parse_time = time.elapsed();

    solve_and_report(&sudoku, common, None, parse_time);
    Ok(())
}

/// Parses a puzzle file and reports its completion-count verdict.
///
/// # Errors
///
/// If the file cannot be read or parsed.
pub(crate) fn check_file(path: &PathBuf, common: &CommonOptions) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = std::time::Instant::now();
    let sudoku = puzzle::parse_file(path).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    println!("Checking: {}", path.display());

    epoch::advance().unwrap();
    let solve_start = std::time::Instant::now();
    let (verdict, search_stats) = search::uniqueness_with_stats(sudoku.board());
    let elapsed = solve_start.elapsed();

    if common.stats {
        let (allocated_mib, resident_mib) = memory_mib();
        print_stats(
            parse_time,
            elapsed,
            &sudoku,
            &search_stats,
            allocated_mib,
            resident_mib,
            false,
            None,
        );
    }

    match verdict {
        Uniqueness::None => println!("Completions: none (UNSOLVABLE)"),
        Uniqueness::One => println!("Completions: exactly one (UNIQUE)"),
        Uniqueness::Many => println!("Completions: more than one (MULTIPLE)"),
    }
    Ok(())
}

/// Solves a directory of puzzle files.
/// This function iterates over all `.sudoku` files in the directory, parses each file,
/// solves it, and reports the results.
///
/// # Errors
///
/// If any file cannot be read or parsed.
pub(crate) fn solve_dir(path: &PathBuf, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        eprintln!("Provided path is not a directory: {}", path.display());
        std::process::exit(1);
    }

    for entry in walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path().to_path_buf();

        if !file_path.is_file() {
            continue;
        }

        if file_path.extension().is_none_or(|ext| ext != "sudoku") {
            eprintln!("Skipping non-puzzle file: {}", file_path.display());
            continue;
        }

        solve_file(&file_path, common)?;
    }

    Ok(())
}

/// Verifies a found solution against the row, column, and block constraints.
///
/// Prints whether the verification was successful. If verification fails, it panics.
/// If `sol` is `None` (no completion exists), it prints "UNSOLVABLE".
pub(crate) fn verify_solution(sol: Option<&Board>) {
    if let Some(board) = sol {
        let ok = validator::is_valid_board(board);
        println!("Verified: {ok:?}");
        assert!(ok, "Solution failed verification!");
    } else {
        println!("UNSOLVABLE");
    }
}

/// Runs the selected search on a puzzle.
///
/// # Returns
/// A tuple containing:
/// * `Option<Board>`: The solved board if a completion exists, otherwise `None`.
/// * `Duration`: The time taken by the search.
/// * `SearchStats`: Statistics collected during the search.
pub(crate) fn solve(
    sudoku: &Sudoku,
    common: &CommonOptions,
    label: Option<&PathBuf>,
) -> (Option<Board>, Duration, SearchStats) {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    if common.debug {
        println!("Puzzle:\n{sudoku}");
        println!("Side length: {}", sudoku.board().n());
        println!("Unknowns: {}", sudoku.board().unknown_count());
        println!("Algorithm: {}", common.algorithm);
    }

    epoch::advance().unwrap();

    let time = std::time::Instant::now();

    let (sol, search_stats) = match common.algorithm {
        Algorithm::Pruned => search::solve_pruned_with_stats(sudoku.board()),
        Algorithm::Exhaustive => search::solve_exhaustive_with_stats(sudoku.board()),
    };

    let elapsed = time.elapsed();

    if common.debug {
        println!("Solution: {sol:?}");
        println!("Time: {elapsed:?}");
    }

    (sol, elapsed, search_stats)
}

/// Solves a parsed puzzle and reports results including stats and verification.
///
/// This function is a convenience wrapper around `solve`, `verify_solution`, and
/// `print_stats`.
pub(crate) fn solve_and_report(
    sudoku: &Sudoku,
    common: &CommonOptions,
    label: Option<&PathBuf>,
    parse_time: Duration,
) {
    epoch::advance().unwrap();

    let (sol, elapsed, search_stats) = solve(sudoku, common, label);

    let (allocated_mib, resident_mib) = memory_mib();

    if common.verify {
        verify_solution(sol.as_ref());
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            sudoku,
            &search_stats,
            allocated_mib,
            resident_mib,
            common.print_solution,
            sol.as_ref(),
        );
    }
}

/// Reads allocated and resident memory from jemalloc, in MiB.
fn memory_mib() -> (f64, f64) {
    epoch::advance().unwrap();

    let allocated_bytes = stats::allocated::mib().unwrap().read().unwrap();
    let resident_bytes = stats::resident::mib().unwrap().read().unwrap();

    let allocated_mib = allocated_bytes as f64 / (1024.0 * 1024.0);
    let resident_mib = resident_bytes as f64 / (1024.0 * 1024.0);

    (allocated_mib, resident_mib)
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
///
/// # Arguments
/// * `parse_time` - Duration spent parsing the input.
/// * `elapsed` - Duration spent by the search.
/// * `sudoku` - The parsed puzzle.
/// * `s` - `SearchStats` collected by the search.
/// * `allocated` - Allocated memory in MiB.
/// * `resident` - Resident memory in MiB.
/// * `print_solution` - Flag indicating whether to print the solved board.
/// * `solution` - The solved board, if one exists.
#[allow(clippy::too_many_arguments)]
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    sudoku: &Sudoku,
    s: &SearchStats,
    allocated: f64,
    resident: f64,
    print_solution: bool,
    solution: Option<&Board>,
) {
    let elapsed_secs = elapsed.as_secs_f64();
    let n = sudoku.board().n();
    let unknowns = sudoku.board().unknown_count();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Side length", n);
    stat_line("Cells", n * n);
    stat_line("Givens", n * n - unknowns);
    stat_line("Unknowns", unknowns);

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Nodes", s.nodes, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Leaves", s.leaves, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if let Some(board) = solution {
        if print_solution {
            println!("Solution:\n{board}");
        }
    }

    if solution.is_some() {
        println!("\nSOLVED");
    } else {
        println!("\nUNSOLVABLE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn algorithm_names_match_value_enum() {
        assert_eq!(Algorithm::Pruned.to_string(), "pruned");
        assert_eq!(Algorithm::Exhaustive.to_string(), "exhaustive");
        assert_eq!(Algorithm::default(), Algorithm::Pruned);
    }

    #[test]
    fn solve_text_accepts_a_puzzle() {
        let common = CommonOptions {
            stats: false,
            verify: false,
            ..CommonOptions::default()
        };
        assert!(solve_text("1 ? 3 ?\n3 4 ? 2\n? 1 4 ?\n4 ? ? 1", &common).is_ok());
        assert!(solve_text("not a puzzle", &common).is_err());
    }
}
