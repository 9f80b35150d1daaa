use rand::Rng;
use rsvp_core::PictureId;

use crate::config::ExperimentConfig;
use crate::pictures::PicturePools;
use crate::plan::{build_experiment_plan, TrialPlan};
use crate::pool::PoolError;
use crate::quadrants::QuadrantPools;
use crate::verify::{verify_balance, BalanceReport};

/// Every finite resource a session consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPools {
    pub quadrants: QuadrantPools,
    pub pictures: PicturePools,
}

impl SessionPools {
    pub fn verify(&self) -> BalanceReport {
        verify_balance(&self.quadrants, &self.pictures)
    }
}

/// Plan and pools for one session, built before any trial runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInventory {
    pub plan: Vec<TrialPlan>,
    pub pools: SessionPools,
}

impl SessionInventory {
    /// Plan first, then quadrant pools, then picture pools, all from one rng
    /// so a fixed seed reproduces the whole inventory.
    pub fn build<R: Rng + ?Sized>(
        config: &ExperimentConfig,
        pictures: Vec<PictureId>,
        rng: &mut R,
    ) -> Result<Self, PoolError> {
        let super_blocks = config.super_blocks();
        let plan = build_experiment_plan(super_blocks, config.durations_ms, rng)?;
        let quadrants = QuadrantPools::build(super_blocks, rng);
        let pictures =
            PicturePools::allocate(pictures, config.n_pics_old(), config.n_pics_new(), rng);
        Ok(Self {
            plan,
            pools: SessionPools {
                quadrants,
                pictures,
            },
        })
    }
}
