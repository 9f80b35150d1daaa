mod app;
mod console;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rsvp_experiment::ExperimentConfig;
use tracing_subscriber::EnvFilter;

use app::{analyze_file, apply_overrides, App, RunOptions};

#[derive(Parser)]
#[command(name = "rsvp", version, about = "Potter & Fox (2009) Exp 2 RSVP memory experiment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct PlanArgs {
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run all 15 super-blocks (75 trials) instead of 1
    #[arg(long)]
    full: bool,
    #[arg(long, conflicts_with = "full")]
    super_blocks: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl PlanArgs {
    fn config(&self) -> Result<ExperimentConfig> {
        let base = match &self.config {
            Some(path) => ExperimentConfig::load_from_file(path)?,
            None => ExperimentConfig::default(),
        };
        Ok(apply_overrides(base, self.full, self.super_blocks, self.seed))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session and write the data log
    Run {
        #[command(flatten)]
        plan: PlanArgs,
        /// Folder with the picture files
        #[arg(long)]
        pictures: Option<PathBuf>,
        #[arg(long, default_value = "experiment_results.csv")]
        out: PathBuf,
        /// Answer with a simulated participant instead of the keyboard
        #[arg(long)]
        simulate: bool,
    },
    /// Print the trial plan a seed produces
    Plan {
        #[command(flatten)]
        plan: PlanArgs,
    },
    /// Summarise an existing data log
    Analyze { data: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            plan,
            pictures,
            out,
            simulate,
        } => {
            let options = RunOptions {
                pictures,
                out,
                simulate,
            };
            App::new(plan.config()?).run(&options)?;
        }
        Commands::Plan { plan } => {
            println!("{}", App::new(plan.config()?).plan_json()?);
        }
        Commands::Analyze { data } => analyze_file(&data)?,
    }

    Ok(())
}
