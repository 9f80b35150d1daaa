use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pool::{Pool, PoolError, PoolLabel};
use crate::prototype::{super_block_prototype, FrameSizes, TRIALS_PER_SUPER_BLOCK};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    /// 1-based for main trials, negative for practice.
    pub trial_id: i32,
    pub duration_ms: u64,
    pub n_values: FrameSizes,
}

/// Balanced durations for `n_trials`: `n_trials / 3` of each, the remainder
/// filled by cycling the three values in order, then shuffled.
pub fn build_duration_pool<R: Rng + ?Sized>(
    n_trials: usize,
    durations_ms: [u64; 3],
    rng: &mut R,
) -> Pool<u64> {
    let reps = n_trials / durations_ms.len();
    let mut pool: Vec<u64> = durations_ms
        .iter()
        .flat_map(|&d| std::iter::repeat(d).take(reps))
        .collect();
    let deficit = n_trials - pool.len();
    pool.extend(durations_ms.iter().copied().cycle().take(deficit));
    Pool::shuffled(PoolLabel::Durations, pool, rng)
}

/// Builds the `5 * super_blocks` trial plan.
///
/// Trial order is shuffled once over the tiled prototype; each trial's own
/// frame order is shuffled independently afterwards.
pub fn build_experiment_plan<R: Rng + ?Sized>(
    super_blocks: usize,
    durations_ms: [u64; 3],
    rng: &mut R,
) -> Result<Vec<TrialPlan>, PoolError> {
    let n_trials = TRIALS_PER_SUPER_BLOCK * super_blocks;
    info!(n_trials, "Generating trial plan");

    let prototype = super_block_prototype();
    let mut trials: Vec<FrameSizes> = prototype
        .iter()
        .copied()
        .cycle()
        .take(n_trials)
        .collect();
    trials.shuffle(rng);

    let mut durations = build_duration_pool(n_trials, durations_ms, rng);

    let mut plan = Vec::with_capacity(n_trials);
    for (i, mut n_values) in trials.into_iter().enumerate() {
        n_values.shuffle(rng);
        plan.push(TrialPlan {
            trial_id: i as i32 + 1,
            duration_ms: durations.pop()?,
            n_values,
        });
    }
    Ok(plan)
}

/// The three fixed practice trials shown before the main run.
pub fn practice_plan(duration_ms: u64) -> Vec<TrialPlan> {
    [
        [1, 0, 2, 0, 3, 0],
        [4, 0, 0, 1, 0, 1],
        [0, 2, 0, 2, 0, 2],
    ]
    .into_iter()
    .enumerate()
    .map(|(i, n_values)| TrialPlan {
        trial_id: -(i as i32 + 1),
        duration_ms,
        n_values,
    })
    .collect()
}
