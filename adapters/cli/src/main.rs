#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the sample manipulator.
//!
//! The adapter collects command strings, hands them to the simulation engine,
//! optionally animates every step on stderr, and prints the resulting history
//! on stdout.

mod animation;
mod config;
mod session;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use manipulator_system_history::HistoryLog;
use manipulator_system_optimizer::optimize;
use manipulator_system_simulation::{NoopObserver, ThrottledObserver};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{
    animation::GridAnimator,
    config::{SessionFile, SessionOverrides, SessionSettings},
    session::Session,
};

/// Drives a simulated manipulator across a grid of samples.
#[derive(Debug, Parser)]
#[command(name = "manipulator", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Executes command strings against one session and prints the history.
    Run(RunArgs),
    /// Prints the compressed encoding of each command string.
    Optimize {
        /// Command strings to compress.
        #[arg(required = true)]
        commands: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Command strings executed in order (Л left, П right, В up, Н down, О pick, Б drop).
    #[arg(required = true)]
    commands: Vec<String>,
    /// TOML file providing `side`, `sample_count`, `seed` and `delay_ms`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for sample placement; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of cells along each grid edge.
    #[arg(long)]
    side: Option<u32>,
    /// Number of samples scattered on the grid.
    #[arg(long)]
    samples: Option<usize>,
    /// Pause after each animated step, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Draws the grid on stderr after every step.
    #[arg(long)]
    animate: bool,
    /// Restores the generated layout before every run after the first.
    #[arg(long)]
    reset_between: bool,
    /// Prints the history as a JSON array instead of a table.
    #[arg(long)]
    json: bool,
}

/// Entry point for the manipulator command-line interface.
fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().command {
        CliCommand::Run(args) => run(args),
        CliCommand::Optimize { commands } => {
            let mut stdout = io::stdout().lock();
            for command in commands {
                writeln!(stdout, "{}", optimize(&command)).context("failed to write output")?;
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: RunArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => SessionFile::load(path)?,
        None => SessionFile::default(),
    };
    let settings = SessionSettings::resolve(
        file,
        SessionOverrides {
            side: args.side,
            sample_count: args.samples,
            seed: args.seed,
            delay_ms: args.delay_ms,
        },
    )?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        side = settings.grid.side(),
        samples = settings.grid.sample_count(),
        "starting session"
    );
    let mut session = Session::generate(settings.grid, &mut ChaCha8Rng::seed_from_u64(seed));

    for (index, commands) in args.commands.iter().enumerate() {
        if args.reset_between && index > 0 {
            session.reset()?;
        }

        if args.animate {
            let samples = session.snapshot()?.samples;
            let animator = GridAnimator::new(io::stderr(), session.grid().side(), &samples);
            let mut observer = ThrottledObserver::new(animator, settings.delay);
            let _ = session.execute(commands, &mut observer)?;
            let _ = observer
                .into_inner()
                .finish()
                .context("failed to draw animation frames")?;
        } else {
            let _ = session.execute(commands, &mut NoopObserver)?;
        }
    }

    let mut stdout = io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", session.history().to_json_pretty()?)
            .context("failed to write history")?;
    } else {
        write_table(&mut stdout, session.history())?;
    }
    Ok(())
}

fn write_table(out: &mut impl Write, history: &HistoryLog) -> Result<()> {
    writeln!(
        out,
        "{:<24} {:<16} {:<26} {:<40} {}",
        "Original Command", "Optimized Command", "Date & Time", "Initial State", "Final State"
    )?;
    for record in history.iter() {
        writeln!(
            out,
            "{:<24} {:<16} {:<26} {:<40} {}",
            record.original_command(),
            record.optimized_command(),
            record.timestamp_rfc3339()?,
            record.initial_state_json()?,
            record.final_state_json()?,
        )?;
    }
    Ok(())
}
