mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::scenario::{RunOutput, Scenario};

#[derive(Parser)]
#[command(name = "hf", about = "Higgs field engine simulator")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Write the JSON result here instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in two-point scenario
    Demo {
        /// Interaction steps to run
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },

    /// Run a TOML scenario file
    Simulate {
        /// Scenario file path
        path: PathBuf,

        /// Override the scenario's step count
        #[arg(long)]
        steps: Option<usize>,
    },

    /// Run a seeded random scenario
    Random {
        /// Number of field points
        #[arg(long, default_value_t = 20)]
        points: usize,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Interaction steps to run
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scenario = match &cli.command {
        Commands::Demo { steps } => Scenario::demo(*steps),
        Commands::Simulate { path, steps } => {
            let mut scenario = Scenario::load(path)?;
            if let Some(steps) = steps {
                scenario.steps = *steps;
            }
            scenario
        }
        Commands::Random {
            points,
            seed,
            steps,
        } => {
            let mut rng = SmallRng::seed_from_u64(*seed);
            Scenario::random(*points, *steps, &mut rng)
        }
    };

    tracing::info!(
        points = scenario.points.len(),
        steps = scenario.steps,
        "running scenario"
    );
    let output = scenario::run(&scenario)?;

    if cli.verbose {
        eprintln!(
            "--- points={}, literals={}, stability={}, coupling={:.4}, diagnostics={} ---",
            output.snapshot.points.len(),
            output.snapshot.literals,
            output.snapshot.stability,
            output.snapshot.coupling_factor,
            output.diagnostics.len(),
        );
    }

    emit(&output, cli.out.as_deref())
}

fn emit(output: &RunOutput, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("failed to serialize result")?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
