use std::io::Write;

use anyhow::Result;
use rand::Rng;
use rsvp_core::{Phase, Screen, TestRecord};
use rsvp_timing::Timer;
use tracing::{error, info};

use crate::analysis::{analyze, SummaryReport};
use crate::config::ExperimentConfig;
use crate::datalog::DataLog;
use crate::frontend::Frontend;
use crate::inventory::{SessionInventory, SessionPools};
use crate::plan::{practice_plan, TrialPlan};
use crate::trial::{Trial, TrialMode};
use crate::verify::BalanceReport;

const WELCOME_TEXT: &str = "You will see a series of rapidly presented pictures.\n\n\
Please watch carefully and try to remember them.\n\n\
After each sequence, you will be given a memory test.\n\
Several pictures will be shown one by one.\n\n\
--- TEST INSTRUCTIONS ---\n\
1. A picture will FLASH for a very short time (400ms).\n\
2. The screen will then go BLANK.\n\
3. *When the screen is blank*, please respond:\n\n\
Press 'y' for YES (you saw it in the sequence).\n\
Press 'n' for NO (you did not see it).\n\n\
We will begin with 3 practice trials.\n\nPress any key to start.";

const PRACTICE_DONE_TEXT: &str = "The main experiment will now begin.\n\n\
The rules are the same as in the practice.\n\
Remember: Respond *after* the picture disappears, when the screen is blank.\n\n\
Please try your best to remember the pictures.\n\nPress any key to start.";

/// Shortest run that still gets rest breaks.
const MIN_TRIALS_FOR_BREAKS: usize = 6;

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub trials_run: usize,
    pub records_logged: usize,
    pub balance: BalanceReport,
    /// `None` when no main trial ran.
    pub summary: Option<SummaryReport>,
}

/// Runs one participant through welcome, practice, the main plan and debrief.
pub struct ExperimentSession<P, T, R>
where
    P: Phase,
    T: Timer,
    R: Rng,
{
    pub phase: P,
    pub timer: T,
    pub rng: R,
    pub config: ExperimentConfig,
    pub plan: Vec<TrialPlan>,
    pub pools: SessionPools,
    pub trial_number: usize,
    pub results: Vec<TestRecord>,
}

impl<P, T, R> ExperimentSession<P, T, R>
where
    P: Phase,
    T: Timer,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, inventory: SessionInventory, timer: T, rng: R) -> Self {
        Self {
            phase: P::default(),
            timer,
            rng,
            config,
            plan: inventory.plan,
            pools: inventory.pools,
            trial_number: 0,
            results: Vec::new(),
        }
    }

    pub fn advance_phase(&mut self) -> bool {
        if let Some(next) = self.phase.next() {
            self.phase = next;
            info!(phase = ?self.phase, "phase started");
            true
        } else {
            false
        }
    }

    /// Runs every remaining phase. A pool running dry aborts the whole session.
    pub fn run<F, W>(mut self, frontend: &mut F, log: &mut DataLog<W>) -> Result<SessionOutcome>
    where
        F: Frontend + ?Sized,
        W: Write,
    {
        loop {
            let phase = self.phase;
            if phase.is_welcome() {
                frontend.present(&Screen::text("Welcome to the Experiment", WELCOME_TEXT))?;
                frontend.wait_continue()?;
            } else if phase.is_practice() {
                self.run_practice(frontend)?;
            } else if phase.is_experiment() {
                self.run_experiment(frontend, log)?;
            } else if phase.is_debrief() {
                return self.debrief(frontend, log);
            }

            if !self.advance_phase() {
                return self.debrief(frontend, log);
            }
        }
    }

    fn run_practice<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> Result<()> {
        for plan in practice_plan(self.config.practice_duration_ms) {
            let trial = Trial::prepare(&plan, TrialMode::Practice, &mut self.pools, &mut self.rng)?;
            trial.run(
                &self.config,
                &mut self.pools,
                frontend,
                &self.timer,
                &mut self.rng,
            )?;
        }
        frontend.present(&Screen::text("Practice Complete", PRACTICE_DONE_TEXT))?;
        frontend.wait_continue()
    }

    fn run_experiment<F, W>(&mut self, frontend: &mut F, log: &mut DataLog<W>) -> Result<()>
    where
        F: Frontend + ?Sized,
        W: Write,
    {
        let plan = std::mem::take(&mut self.plan);
        let n_trials = plan.len();

        for trial_plan in &plan {
            let records = match self.run_main_trial(trial_plan, frontend) {
                Ok(records) => records,
                Err(e) => {
                    error!(trial_id = trial_plan.trial_id, "FATAL: {e:#}");
                    return Err(e.context(format!("trial {} aborted", trial_plan.trial_id)));
                }
            };

            for record in &records {
                log.append(record)?;
            }
            self.results.extend(records);
            self.trial_number += 1;
            info!(
                trial = self.trial_number,
                of = n_trials,
                "trial complete"
            );

            if self.rest_break_due(n_trials) {
                frontend.present(&Screen::text(
                    "Rest Break",
                    format!(
                        "You have completed {} / {} trials.\n\n\
                         Please take a short break.\n\nPress any key to continue.",
                        self.trial_number, n_trials
                    ),
                ))?;
                frontend.wait_continue()?;
            }
        }
        Ok(())
    }

    fn run_main_trial<F: Frontend + ?Sized>(
        &mut self,
        plan: &TrialPlan,
        frontend: &mut F,
    ) -> Result<Vec<TestRecord>> {
        let trial = Trial::prepare(plan, TrialMode::Main, &mut self.pools, &mut self.rng)?;
        trial.run(
            &self.config,
            &mut self.pools,
            frontend,
            &self.timer,
            &mut self.rng,
        )
    }

    fn rest_break_due(&self, n_trials: usize) -> bool {
        let every = self.config.rest_break_every;
        n_trials >= MIN_TRIALS_FOR_BREAKS
            && every > 0
            && self.trial_number % every == 0
            && self.trial_number < n_trials
    }

    fn debrief<F, W>(self, frontend: &mut F, log: &mut DataLog<W>) -> Result<SessionOutcome>
    where
        F: Frontend + ?Sized,
        W: Write,
    {
        log.flush()?;

        let summary = if self.trial_number > 0 {
            info!("running analysis");
            Some(analyze("", &self.results))
        } else {
            info!("no trials run, skipping analysis");
            None
        };

        let goodbye = if summary.is_some() {
            "Experiment complete. Thank you!"
        } else {
            "Experiment complete."
        };
        frontend.present(&Screen::text("Goodbye", goodbye))?;

        let balance = self.pools.verify();

        Ok(SessionOutcome {
            trials_run: self.trial_number,
            records_logged: log.rows(),
            balance,
            summary,
        })
    }
}
