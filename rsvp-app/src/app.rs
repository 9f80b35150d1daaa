use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsvp_core::{PictureId, StandardPhase};
use rsvp_experiment::{
    analyze, build_experiment_plan, load_picture_names, read_records, write_summary, DataLog,
    ExperimentConfig, ExperimentSession, Frontend, ParticipantProfile, RunLength,
    SessionInventory, SessionOutcome, SimulatedParticipant,
};
use rsvp_timing::{HighPrecisionTimer, Timer, VirtualTimer};
use tracing::{info, warn};

use crate::console::ConsoleFrontend;

/// Where the pictures come from and who answers.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pictures: Option<PathBuf>,
    pub out: PathBuf,
    pub simulate: bool,
}

/// Mixed into the session seed for the picture-order stream, so the folder
/// shuffle never shifts the draws the plan and pools are built from.
const PICTURE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct App {
    config: ExperimentConfig,
    seed: u64,
}

impl App {
    pub fn new(config: ExperimentConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, super_blocks = config.super_blocks(), "session configured");
        Self { config, seed }
    }

    pub fn run(self, options: &RunOptions) -> Result<SessionOutcome> {
        println!("=== POTTER & FOX (2009) EXP 2: RSVP MEMORY ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Trials: {} (+3 practice)\n", self.config.n_trials());

        let pictures = match (&options.pictures, options.simulate) {
            (Some(dir), _) => {
                let mut picture_rng = StdRng::seed_from_u64(self.seed ^ PICTURE_STREAM);
                load_picture_names(dir, &self.config.picture_extensions, &mut picture_rng)?
            }
            (None, true) => synthetic_pictures(self.config.n_pics_total()),
            (None, false) => anyhow::bail!("--pictures is required unless --simulate is given"),
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        let inventory = SessionInventory::build(&self.config, pictures, &mut rng)
            .context("cannot build the trial plan")?;

        let mut log = DataLog::create(&options.out)?;
        let outcome = if options.simulate {
            let timer = VirtualTimer::new();
            let mut frontend =
                SimulatedParticipant::new(ParticipantProfile::default(), self.seed, timer.clone());
            self.run_session(inventory, timer, rng, &mut frontend, &mut log)?
        } else {
            let timer = HighPrecisionTimer::new();
            let stdin = io::stdin();
            let mut frontend = ConsoleFrontend::new(timer.clone(), stdin.lock(), io::stdout());
            self.run_session(inventory, timer, rng, &mut frontend, &mut log)?
        };

        report_outcome(&options.out, &outcome)?;
        Ok(outcome)
    }

    fn run_session<T: Timer, F: Frontend>(
        &self,
        inventory: SessionInventory,
        timer: T,
        rng: StdRng,
        frontend: &mut F,
        log: &mut DataLog<std::fs::File>,
    ) -> Result<SessionOutcome> {
        let session: ExperimentSession<StandardPhase, T, StdRng> =
            ExperimentSession::new(self.config.clone(), inventory, timer, rng);
        session.run(frontend, log)
    }

    /// The plan a given seed would produce, as JSON. Draws from the same
    /// stream `run` builds its inventory from.
    pub fn plan_json(&self) -> Result<String> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let plan = build_experiment_plan(
            self.config.super_blocks(),
            self.config.durations_ms,
            &mut rng,
        )?;
        Ok(serde_json::to_string_pretty(&plan)?)
    }
}

fn synthetic_pictures(n: usize) -> Vec<PictureId> {
    (0..n)
        .map(|i| PictureId::from(format!("sim_{i:04}.jpg")))
        .collect()
}

fn report_outcome(data_file: &Path, outcome: &SessionOutcome) -> Result<()> {
    info!(
        trials = outcome.trials_run,
        rows = outcome.records_logged,
        data = %data_file.display(),
        "session finished"
    );
    if let Some(summary) = &outcome.summary {
        let mut summary = summary.clone();
        summary.data_file = file_name(data_file);
        let path = write_summary(data_file, &summary)?;
        println!("{}", summary.overall_line());
        println!("Summary saved to: {}", path.display());
    }
    if !outcome.balance.is_balanced() {
        warn!("{}", outcome.balance);
    }
    println!("Balance check: {}", outcome.balance);
    Ok(())
}

/// Post-hoc analysis of an existing data file.
pub fn analyze_file(data_file: &Path) -> Result<()> {
    let records = read_records(data_file)?;
    let report = analyze(&file_name(data_file), &records);
    let path = write_summary(data_file, &report)?;
    println!("{report}");
    println!("\nSummary saved to: {}", path.display());
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Applies command-line overrides on top of a loaded or default config.
pub fn apply_overrides(
    mut config: ExperimentConfig,
    full: bool,
    super_blocks: Option<usize>,
    seed: Option<u64>,
) -> ExperimentConfig {
    if full {
        config.run_length = RunLength::Full;
    }
    if let Some(r) = super_blocks {
        config.run_length = RunLength::Custom(r);
    }
    if seed.is_some() {
        config.seed = seed;
    }
    config
}
