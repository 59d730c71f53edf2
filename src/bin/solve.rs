//! Batch equilibrium solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve -- [OPTIONS] <PARAMS.json>
//!
//! The input file holds one parameter object or an array of them, using
//! model notation (`N`, `n`, `r`, `c`, `Rmin`, `Rmax`, `Tmax`, `b`, `k`, `f`).
//! Instances are independent and are solved in parallel.
//!
//! Options:
//!   --exact              Use the exhaustive tree solver
//!   --warn-ties          Log ties and keep the earliest day instead of failing
//!   --tolerance <X>      Relative tie tolerance (default: 1e-9)
//!   --max-cells <N>      Largest n * Tmax the exact solver accepts (default: 16)
//!   --output <FILE>      Output file (default: equilibria.json)
//!   --quiet              Do not print the summary table
//!
//! Set RUST_LOG=debug to trace individual best responses.

use std::env;
use std::fmt::Display;
use std::fs;
use std::str::FromStr;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use dispersal_nash::model::{GameParameters, SolverConfig, TiePolicy};
use dispersal_nash::solver::{
    EquilibriumSolver, ExactSolver, FastSolver, InstanceReport, SolveReport,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input: Option<String> = None;
    let mut exact = false;
    let mut config = SolverConfig::default();
    let mut output_file = "equilibria.json".to_string();
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--exact" | "-e" => {
                exact = true;
            }
            "--warn-ties" | "-w" => {
                config.tie_policy = TiePolicy::Warn;
            }
            "--tolerance" => {
                i += 1;
                if i < args.len() {
                    config.tolerance = parse_or_keep("--tolerance", &args[i], config.tolerance);
                }
            }
            "--max-cells" => {
                i += 1;
                if i < args.len() {
                    config.max_exact_cells =
                        parse_or_keep("--max-cells", &args[i], config.max_exact_cells);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--quiet" | "-q" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            arg if !arg.starts_with('-') && input.is_none() => {
                input = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    let Some(path) = input else {
        eprintln!("Missing parameter file");
        print_help();
        return;
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid solver configuration: {}", e);
        return;
    }

    let batch = match fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| GameParameters::batch_from_json_str(&json).map_err(|e| e.to_string()))
    {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            return;
        }
    };

    let solver: Box<dyn EquilibriumSolver + Sync> = if exact {
        Box::new(ExactSolver::new(config))
    } else {
        Box::new(FastSolver::new(config))
    };

    log::info!("solving {} instances with the {} solver", batch.len(), solver.name());

    let start = Instant::now();
    let progress = ProgressBar::new(batch.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let instances: Vec<InstanceReport> = batch
        .into_par_iter()
        .map(|params| {
            let result = solver.solve(&params);
            if let Err(e) = &result {
                log::warn!("{:?}: {}", params, e);
            }
            progress.inc(1);
            InstanceReport::new(params, result)
        })
        .collect();

    progress.finish_and_clear();

    let mut report = SolveReport::new(solver.name());
    for instance in instances {
        report.add_instance(instance);
    }
    report.metadata.elapsed_secs = start.elapsed().as_secs_f64();

    log::info!(
        "solved {}/{} instances in {:.3}s",
        report.solved(),
        report.instances.len(),
        report.metadata.elapsed_secs
    );

    match report.save_json(&output_file) {
        Ok(_) => println!("Saved JSON: {}", output_file),
        Err(e) => eprintln!("Error saving JSON: {}", e),
    }

    if !quiet {
        report.print_summary();
    }
}

/// Parse a flag's value, warning and keeping `current` when it is malformed.
fn parse_or_keep<T: FromStr + Display>(flag: &str, value: &str, current: T) -> T {
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            log::warn!("ignoring {} {:?}, keeping {}", flag, value, current);
            current
        }
    }
}

fn print_help() {
    println!("Dispersal equilibrium solver");
    println!();
    println!("Usage: solve [OPTIONS] <PARAMS.json>");
    println!();
    println!("Options:");
    println!("  -e, --exact            Use the exhaustive tree solver");
    println!("  -w, --warn-ties        Keep the earliest day on ties instead of failing");
    println!("      --tolerance <X>    Relative tie tolerance (default: 1e-9)");
    println!("      --max-cells <N>    Largest n * Tmax for the exact solver (default: 16)");
    println!("  -o, --output <FILE>    Output file (default: equilibria.json)");
    println!("  -q, --quiet            Do not print the summary table");
    println!("  -h, --help             Show this help");
}
