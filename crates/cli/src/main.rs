#![forbid(unsafe_code)]

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use render::{render_solution, render_verification, TableauPrinter};
use std::io::Write;
use std::path::PathBuf;
use tabrs_api::{demo_problem, verify_solution, Solution, Solver};
use tabrs_core::math::Scalar;
use tabrs_core::options::SolveOptions;
use tabrs_core::problem::ProblemLP;
use tabrs_io::{read_json_problem, write_solution};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabrs")]
#[command(version, about = "Narrated tabular Simplex solver")]
struct Cli {
    #[arg(long)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct TraceArgs {
    /// Print the tableau after construction and after every pivot.
    #[arg(long)]
    trace: bool,
    /// Wait for Enter after each printed tableau (implies --trace).
    #[arg(long)]
    pause: bool,
    /// Zero tolerance used by every test in the engine.
    #[arg(long, value_parser = parse_tolerance)]
    tol: Option<f64>,
}

fn parse_tolerance(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|err| format!("`{raw}` is not a number: {err}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("tolerance must be finite and non-negative, got {raw}"));
    }
    Ok(value)
}

#[derive(Subcommand)]
enum Commands {
    Solve {
        #[arg(long)]
        problem: PathBuf,
        #[command(flatten)]
        trace: TraceArgs,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the solution as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Solve the built-in example: maximize 3x1 + 2x2.
    Demo {
        #[command(flatten)]
        trace: TraceArgs,
    },
    Check {
        #[arg(long)]
        problem: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json)?;
    match cli.command {
        Commands::Solve {
            problem,
            trace,
            output,
            json,
        } => {
            let lp = read_json_problem(&problem)?;
            solve_command(&lp, &trace, output, json)
        }
        Commands::Demo { trace } => solve_command(&demo_problem(), &trace, None, false),
        Commands::Check { problem } => check_command(problem),
    }
}

fn initialize_tracing(log_json: bool) -> Result<()> {
    if log_json {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init()
            .ok();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    }
    Ok(())
}

fn solve_command(
    problem: &ProblemLP<Scalar>,
    args: &TraceArgs,
    output: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    let mut options = SolveOptions::<Scalar>::default();
    if let Some(tolerance) = args.tol {
        options.tolerance = tolerance as Scalar;
    }

    let mut solver = Solver::<Scalar>::new().options(options);
    let solution = if args.trace || args.pause {
        let mut printer = TableauPrinter::new(std::io::stdout(), args.pause);
        let solution = solver.solve_lp_traced(problem, &mut printer)?;
        printer
            .finish(&solution, problem.direction)
            .context("failed to print solution narration")?;
        solution
    } else {
        solver.solve_lp(problem)?
    };
    emit_solution(problem, &solution, output, output_json)
}

fn emit_solution(
    problem: &ProblemLP<Scalar>,
    solution: &Solution<Scalar>,
    output: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if output_json {
        serde_json::to_writer_pretty(&mut handle, solution)?;
        handle.write_all(b"\n")?;
    } else {
        handle.write_all(render_solution(solution, problem.direction).as_bytes())?;
        if let Some(primal) = &solution.primal {
            let report = verify_solution(problem, primal)?;
            handle.write_all(render_verification(&report).as_bytes())?;
        }
    }
    handle.flush()?;
    if let Some(path) = output {
        write_solution(path, solution)?;
    }
    Ok(())
}

fn check_command(path: PathBuf) -> Result<()> {
    let problem = read_json_problem(&path).context("LP validation failed")?;
    println!(
        "LP validation succeeded: {} {} variables, {} constraints.",
        problem.direction,
        problem.nvars(),
        problem.nconstraints()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_must_be_finite_and_non_negative() {
        assert_eq!(parse_tolerance("1e-6"), Ok(1e-6));
        assert_eq!(parse_tolerance("0"), Ok(0.0));
        assert!(parse_tolerance("NaN").is_err());
        assert!(parse_tolerance("inf").is_err());
        assert!(parse_tolerance("-1e-9").is_err());
        assert!(parse_tolerance("tight").is_err());
    }

    #[test]
    fn rejects_nan_tolerance_on_the_command_line() {
        assert!(Cli::try_parse_from(["tabrs", "demo", "--tol", "NaN"]).is_err());
        let cli = Cli::try_parse_from(["tabrs", "demo", "--tol", "1e-7"]).unwrap();
        match cli.command {
            Commands::Demo { trace } => assert_eq!(trace.tol, Some(1e-7)),
            _ => panic!("expected the demo command"),
        }
    }
}
