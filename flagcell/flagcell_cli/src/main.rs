use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flagcell_core::HarnessConfig;
use log::LevelFilter;

mod commands;
mod logger;

/// Flagcell command line harness
///
/// Exercises the plain and lock-guarded flags and reports what it observed.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// TOML configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[clap(long, global = true)]
    log_level: Option<LevelFilter>,

    /// Print reports as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the set/flip/read scenario on both flag variants
    Scenario,

    /// Flip a shared flag once per thread and check the final parity
    Parity {
        /// Threads flipping per round
        #[clap(long)]
        threads: Option<usize>,

        /// Number of rounds
        #[clap(long)]
        rounds: Option<usize>,
    },

    /// Run concurrent readers and writers against a shared flag
    Stress {
        /// Reader threads
        #[clap(long)]
        readers: Option<usize>,

        /// Writer threads
        #[clap(long)]
        writers: Option<usize>,

        /// Operations per thread
        #[clap(long)]
        iterations: Option<usize>,
    },
}

fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("could not load {}", path.display()))?,
        None => HarnessConfig::default(),
    };

    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let stress = &mut config.stress;
    match cli.command {
        Commands::Scenario => {}
        Commands::Parity { threads, rounds } => {
            stress.threads = threads.unwrap_or(stress.threads);
            stress.rounds = rounds.unwrap_or(stress.rounds);
            stress.validate_parity().context("invalid options")?;
        }
        Commands::Stress {
            readers,
            writers,
            iterations,
        } => {
            stress.readers = readers.unwrap_or(stress.readers);
            stress.writers = writers.unwrap_or(stress.writers);
            stress.iterations = iterations.unwrap_or(stress.iterations);
            stress.validate_mixed().context("invalid options")?;
        }
    }

    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    logger::setup(config.log_level).context("could not install logger")?;
    log::debug!("running with {:?}", config);

    let clean = match cli.command {
        Commands::Scenario => commands::scenario::execute(&config, cli.json)?,
        Commands::Parity { .. } => commands::stress::execute_parity(&config, cli.json)?,
        Commands::Stress { .. } => commands::stress::execute_stress(&config, cli.json)?,
    };

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
