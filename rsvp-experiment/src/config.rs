use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prototype::{PICTURES_PER_TRIAL, TRIALS_PER_SUPER_BLOCK};
use rsvp_core::TESTED_NEW_PER_TRIAL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How many super-blocks a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunLength {
    /// One super-block, 5 trials. For piloting the script.
    Short,
    /// Fifteen super-blocks, 75 trials.
    Full,
    Custom(usize),
}

impl RunLength {
    pub fn super_blocks(self) -> usize {
        match self {
            RunLength::Short => 1,
            RunLength::Full => 15,
            RunLength::Custom(r) => r,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub run_length: RunLength,
    /// The three RSVP frame durations, balanced across trials.
    pub durations_ms: [u64; 3],
    pub fixation_ms: u64,
    /// Blank screen between the RSVP stream and the first test picture.
    pub test_pause_ms: u64,
    pub test_picture_ms: u64,
    pub practice_duration_ms: u64,
    pub rest_break_every: usize,
    pub seed: Option<u64>,
    pub picture_extensions: Vec<String>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            run_length: RunLength::Short,
            durations_ms: [240, 400, 720],
            fixation_ms: 500,
            test_pause_ms: 200,
            test_picture_ms: 400,
            practice_duration_ms: 400,
            rest_break_every: 15,
            seed: None,
            picture_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl ExperimentConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn super_blocks(&self) -> usize {
        self.run_length.super_blocks()
    }

    pub fn n_trials(&self) -> usize {
        TRIALS_PER_SUPER_BLOCK * self.super_blocks()
    }

    /// Every shown picture is fresh, so this is also the number of picture slots.
    pub fn n_pics_old(&self) -> usize {
        PICTURES_PER_TRIAL * self.n_trials()
    }

    pub fn n_pics_new(&self) -> usize {
        TESTED_NEW_PER_TRIAL * self.n_trials()
    }

    pub fn n_pics_total(&self) -> usize {
        self.n_pics_old() + self.n_pics_new()
    }
}
