// crates/dp_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing & validation.
// - Exactly one subcommand: `fd` (functional dependency discovery) or
//   `mfd` (metric functional dependency verification).
// - `--data` must name a local, existing file (no scheme prefixes).
// - `mfd` requires at least one LHS index and exactly one RHS index.

use clap::{Parser, Subcommand};
use std::{env, fs, path::PathBuf};

#[derive(Debug, Parser)]
#[command(name = "dp", about = "FD/MFD data profiling engine")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// CSV path to profile.
    #[arg(long, global = true)]
    pub data: PathBuf,

    /// Field delimiter byte, given as a single character.
    #[arg(long, default_value = ",", global = true)]
    pub separator: char,

    /// Whether the first CSV row is a header row.
    #[arg(long, default_value_t = true, global = true)]
    pub has_header: bool,

    /// Treat two nulls as equal when grouping rows.
    #[arg(long, default_value_t = true, global = true)]
    pub equal_nulls: bool,

    /// Suppress the human-readable summary, printing only JSON/verdict.
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover functional dependencies.
    Fd {
        /// Maximum LHS arity to search (0 means unbounded).
        #[arg(long, default_value_t = 0)]
        max_lhs: u64,

        /// Emit the canonical FD JSON instead of the text summary.
        #[arg(long)]
        json: bool,
    },
    /// Verify a metric functional dependency over a fixed LHS/RHS pair.
    Mfd {
        /// Zero-based column indices forming the determinant.
        #[arg(long = "lhs-indices", required = true, num_args = 1..)]
        lhs_indices: Vec<u64>,

        /// Zero-based column index of the dependent column.
        #[arg(long = "rhs-index", required = true)]
        rhs_index: u64,

        /// Distance metric: euclidean, levenshtein, or cosine.
        #[arg(long, default_value = "euclidean")]
        metric: String,

        /// Diameter strategy: brute, approx, or calipers.
        #[arg(long = "metric-algorithm", default_value = "brute")]
        metric_algorithm: String,

        /// Maximum allowed cluster diameter.
        #[arg(long, required = true)]
        parameter: f64,

        /// Whether a null RHS value in a cluster counts as an infinite distance.
        #[arg(long, default_value_t = true)]
        dist_from_null_is_infinity: bool,

        /// Q-gram length for the cosine metric.
        #[arg(long, default_value_t = 2)]
        q: u64,
    },
}

#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadSeparator(char),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "--data must be a local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadSeparator(c) => write!(f, "--separator must be a single ASCII byte, got {c:?}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let mut args = Args::parse();

    ensure_local_exists(&args.data)?;
    args.data = normalize_path(&args.data);

    if !args.separator.is_ascii() {
        return Err(CliError::BadSeparator(args.separator));
    }

    Ok(args)
}

fn ensure_local_exists(p: &PathBuf) -> Result<(), CliError> {
    let s = p.to_string_lossy().to_string();
    if has_scheme(&s) {
        return Err(CliError::NonLocalPath(s));
    }
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(s.clone()))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(s));
    }
    Ok(())
}

fn normalize_path(p: &PathBuf) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.clone()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

fn has_scheme(s: &str) -> bool {
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_local_path_detection() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("scheme://x"));
        assert!(!has_scheme(r"/tmp/file.csv"));
    }

    #[test]
    fn normalize_path_best_effort() {
        let p = PathBuf::from("does/not/exist.csv");
        let abs = normalize_path(&p);
        assert!(abs.is_absolute());
    }

    #[test]
    fn parses_fd_subcommand() {
        let args = Args::parse_from(["dp", "--data", "x.csv", "fd", "--max-lhs", "2"]);
        match args.command {
            Command::Fd { max_lhs, json } => {
                assert_eq!(max_lhs, 2);
                assert!(!json);
            }
            _ => panic!("expected Fd"),
        }
    }

    #[test]
    fn parses_mfd_subcommand() {
        let args = Args::parse_from([
            "dp",
            "--data",
            "x.csv",
            "mfd",
            "--lhs-indices",
            "0",
            "1",
            "--rhs-index",
            "2",
            "--parameter",
            "3.5",
        ]);
        match args.command {
            Command::Mfd { lhs_indices, rhs_index, parameter, .. } => {
                assert_eq!(lhs_indices, vec![0, 1]);
                assert_eq!(rhs_index, 2);
                assert_eq!(parameter, 3.5);
            }
            _ => panic!("expected Mfd"),
        }
    }
}
