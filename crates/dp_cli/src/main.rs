// crates/dp_cli/src/main.rs
//
// dp — CLI entrypoint for the FD/MFD profiling engine.
// Drives dp_pipeline's two entrypoints and renders results via dp_report.
// Strictly offline & deterministic.

mod args;

use args::{parse_and_validate, Args, Command};
use dp_io::csv_source::CsvOptions;
use dp_pipeline::{
    run_fd_discovery, run_mfd_verification, FdDiscoveryConfig, MfdVerificationConfig,
};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("dp: error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dp: error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<ExitCode, String> {
    let csv_opts = CsvOptions { delimiter: args.separator as u8, has_headers: args.has_header };

    match args.command {
        Command::Fd { max_lhs, json } => run_fd(&args, csv_opts, max_lhs, json),
        Command::Mfd {
            lhs_indices,
            rhs_index,
            metric,
            metric_algorithm,
            parameter,
            dist_from_null_is_infinity,
            q,
        } => run_mfd(
            &args,
            csv_opts,
            lhs_indices,
            rhs_index,
            metric,
            metric_algorithm,
            parameter,
            dist_from_null_is_infinity,
            q,
        ),
    }
}

fn run_fd(args: &Args, csv_opts: CsvOptions, max_lhs: u64, json: bool) -> Result<ExitCode, String> {
    let config = FdDiscoveryConfig { equal_nulls: args.equal_nulls, max_lhs_arity: max_lhs };
    let result = run_fd_discovery(&args.data, csv_opts, config).map_err(|e| e.to_string())?;

    info!(fds = result.fds.len(), elapsed = ?result.elapsed, "fd discovery finished");

    if json {
        println!("{}", result.json);
    } else if !args.quiet {
        println!(
            "{}",
            dp_report::render_fd_summary(&result.column_names, &result.fds, &result.keys, result.fletcher16)
        );
    }
    Ok(ExitCode::from(0))
}

#[allow(clippy::too_many_arguments)]
fn run_mfd(
    args: &Args,
    csv_opts: CsvOptions,
    lhs_indices: Vec<u64>,
    rhs_index: u64,
    metric: String,
    metric_algorithm: String,
    parameter: f64,
    dist_from_null_is_infinity: bool,
    q: u64,
) -> Result<ExitCode, String> {
    let config = MfdVerificationConfig {
        lhs_indices,
        rhs_indices: vec![rhs_index],
        metric,
        metric_algorithm,
        parameter,
        dist_from_null_is_infinity,
        q,
        equal_nulls: args.equal_nulls,
    };
    let result = run_mfd_verification(&args.data, csv_opts, config).map_err(|e| e.to_string())?;

    info!(holds = result.holds, highlights = result.highlights.len(), elapsed = ?result.elapsed, "mfd verification finished");

    if !args.quiet {
        println!("{}", dp_report::render_mfd_summary(result.holds, &result.highlights));
        if !result.holds {
            println!(
                "{}",
                dp_report::render_highlights(&result.highlights, &result.column_names, &[rhs_index as usize])
            );
        }
    }

    Ok(if result.holds { ExitCode::from(0) } else { ExitCode::from(3) })
}
