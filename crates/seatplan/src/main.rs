use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::path::PathBuf;

use seatplan::{
    Candidate, Config, Evaluator, Grid, Layout, Mode, RankOptions, Ranker, Roster, SeatMark,
    SeatPlanError, Seating, SolveOptions, Solver, Topology,
};
use strum::IntoEnumIterator;

#[derive(Parser)]
#[command(author, version, about = "Seat a class so forbidden pairs stay apart in both room layouts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "config/default.toml")]
    config: PathBuf,

    /// Single seating or ranked candidates (overrides the config)
    #[arg(short = 'm', long = "mode")]
    mode: Option<Mode>,

    /// Attempt budget
    #[arg(short = 'a', long = "attempts")]
    attempts: Option<usize>,

    /// Number of ranked candidates to keep
    #[arg(short = 'n', long = "candidates")]
    candidates: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,
}

fn main() {
    // defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("Error: {e:#}");
        if e
            .downcast_ref::<SeatPlanError>()
            .is_some_and(SeatPlanError::is_input_error)
        {
            error!(
                "Hint: check the [class] section of {}",
                args.config.display()
            );
        }
        let _ = std::io::stderr().flush();
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = Config::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(mode) = args.mode {
        config.solver.mode = mode;
    }
    if let Some(attempts) = args.attempts {
        config.solver.attempts = attempts;
    }
    if let Some(candidates) = args.candidates {
        config.solver.candidates = candidates;
    }
    config.validate()?;

    let input = config.class_input().context("reading the class roster")?;
    let roster = Roster::build(&input)?;
    let topology = Topology::build();
    let solver = Solver::new(&topology, &roster);

    let seed = match args.seed.or(config.solver.seed) {
        Some(seed) => seed,
        None => {
            let seed = rand::rng().random();
            info!("no seed configured, using {seed}");
            seed
        }
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!("mode: {}, seed: {seed}", config.solver.mode);

    match config.solver.mode {
        Mode::Single => {
            let seating = solver.solve(&mut rng, &SolveOptions::from(&config.solver))?;
            print_seating(&seating);
        }
        Mode::Ranked => {
            let evaluator = Evaluator::new(&topology, &roster, config.scoring.clone());
            let ranker = Ranker::new(&solver, &evaluator);
            let options = RankOptions::from(&config.solver);
            let ranked = ranker.generate_with_progress(&mut rng, &options, |p| {
                info!(
                    "{}/{} attempts, {} candidates, best score {}",
                    p.attempts,
                    p.budget,
                    p.found,
                    p.best_score
                        .map_or_else(|| "-".to_string(), |s| s.to_string())
                );
            })?;
            print_candidates(&ranked);
        }
    }
    Ok(())
}

fn print_candidates(ranked: &[Candidate]) {
    for (i, candidate) in ranked.iter().enumerate() {
        println!("=== Candidate {} (score {}) ===", i + 1, candidate.score);
        if candidate.unmet.is_empty() {
            println!("all preferences met");
        } else {
            for note in &candidate.unmet {
                println!("  - {note}");
            }
        }
        print_seating(&candidate.seating);
    }
}

fn print_seating(seating: &Seating) {
    let width = seating
        .assignment
        .values()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    for layout in Layout::iter() {
        println!();
        println!("Layout {layout} ({} x {})", layout.rows(), layout.cols());
        print!("{}", render_grid(&seating.grid(layout), width));
    }
    println!();
}

/// Plain text grid, front of the room at the top
fn render_grid(grid: &Grid, width: usize) -> String {
    let cell = |mark: &SeatMark| match mark {
        SeatMark::Student(name) => name.clone(),
        SeatMark::Reserved => "—".to_string(),
        SeatMark::Empty => String::new(),
    };

    let bank_width = width * 2 + 3;
    let mut out = format!("{:^w$}\n", "FRONT", w = (bank_width + 2) * grid.layout.cols());
    for row in &grid.banks {
        let line: Vec<String> = row
            .iter()
            .map(|[left, right]| {
                if left.is_empty() && right.is_empty() {
                    format!("{:^bank_width$}", "----")
                } else {
                    format!("[{:<width$} {:<width$}]", cell(left), cell(right))
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}
