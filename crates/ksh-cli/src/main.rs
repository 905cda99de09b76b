use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    closure::{self, ClosureArgs},
    levels::{self, LevelsArgs},
    names::{self, NamesArgs},
    occupations::{self, OccupationsArgs},
    plan::{self, PlanArgs},
    strength::{self, StrengthArgs},
};

#[derive(Parser, Debug)]
#[command(name = "ksh", version, about = "Shell-model campaign bookkeeping")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every file name derived for a configured run.
    Names(NamesArgs),
    /// Parse a run's energy summary.
    Levels(LevelsArgs),
    /// Parse a run's solver logs into occupation records.
    Occupations(OccupationsArgs),
    /// Plan the density files between two runs and write the manifest.
    Plan(PlanArgs),
    /// Sum spectroscopic factors into effective single-particle energies.
    Strength(StrengthArgs),
    /// Evaluate a double-beta closure sum and write its contributions.
    Closure(ClosureArgs),
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Names(args) => names::run(&args),
        Command::Levels(args) => levels::run(&args),
        Command::Occupations(args) => occupations::run(&args),
        Command::Plan(args) => plan::run(&args),
        Command::Strength(args) => strength::run(&args),
        Command::Closure(args) => closure::run(&args),
    }
}
