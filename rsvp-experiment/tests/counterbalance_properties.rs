//! Property-based tests for the counterbalancing pools and the trial plan.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rsvp_core::PictureId;
use rsvp_experiment::quadrants::multiplicity;
use rsvp_experiment::{
    build_experiment_plan, DataLog, ExperimentConfig, ExperimentSession, ParticipantProfile,
    PicturePools, QuadrantPools, RunLength, SessionInventory, SimulatedParticipant, Trial,
    TrialMode,
};
use rsvp_core::StandardPhase;
use rsvp_timing::VirtualTimer;

const DURATIONS: [u64; 3] = [240, 400, 720];

fn binomial4(k: u8) -> usize {
    match k {
        0 | 4 => 1,
        1 | 3 => 4,
        2 => 6,
        _ => 0,
    }
}

fn pictures(n: usize) -> Vec<PictureId> {
    (0..n).map(|i| PictureId::from(format!("stim_{i:04}.jpg"))).collect()
}

fn config(super_blocks: usize) -> ExperimentConfig {
    ExperimentConfig {
        run_length: RunLength::Custom(super_blocks),
        ..Default::default()
    }
}

proptest! {
    // 1. Pool k holds R * multiplicity(k) * C(4, k) combinations
    #[test]
    fn pool_sizes_follow_closed_form(r in 1usize..=20, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pools = QuadrantPools::build(r, &mut rng);
        for k in 1..=4u8 {
            prop_assert_eq!(pools.len(k), r * multiplicity(k) * binomial4(k));
            prop_assert_eq!(pools.len(k), QuadrantPools::expected_len(k, r));
        }
    }

    // 2. 5R trials; each duration floor(5R/3) or floor(5R/3) + 1 times
    #[test]
    fn plan_durations_are_balanced(r in 1usize..=30, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = build_experiment_plan(r, DURATIONS, &mut rng).unwrap();
        let n = 5 * r;
        prop_assert_eq!(plan.len(), n);

        let mut counts: HashMap<u64, usize> = HashMap::new();
        for t in &plan {
            *counts.entry(t.duration_ms).or_default() += 1;
        }
        let total: usize = counts.values().sum();
        prop_assert_eq!(total, n);
        for d in DURATIONS {
            let c = counts.get(&d).copied().unwrap_or(0);
            prop_assert!(c == n / 3 || c == n / 3 + 1, "duration {} appears {} times", d, c);
        }
        // the extra counts go to the first values in order
        let extras: Vec<bool> = DURATIONS.iter().map(|d| counts[d] > n / 3).collect();
        let expected: Vec<bool> = (0..3).map(|i| i < n % 3).collect();
        prop_assert_eq!(extras, expected);
    }

    // 3. Same seed, same plan and pools
    #[test]
    fn seeded_construction_is_reproducible(r in 0usize..=6, seed in any::<u64>()) {
        let cfg = config(r);
        let build = || {
            let mut rng = StdRng::seed_from_u64(seed);
            SessionInventory::build(&cfg, pictures(cfg.n_pics_total()), &mut rng).unwrap()
        };
        prop_assert_eq!(build(), build());
    }

    // 4. Exact supply splits into disjoint, duplicate-free old and new pools
    #[test]
    fn exact_picture_supply_partitions_cleanly(r in 1usize..=15, seed in any::<u64>()) {
        let cfg = config(r);
        let mut rng = StdRng::seed_from_u64(seed);
        let pools = PicturePools::allocate(
            pictures(cfg.n_pics_total()),
            cfg.n_pics_old(),
            cfg.n_pics_new(),
            &mut rng,
        );
        let old: HashSet<_> = pools.old().items().iter().collect();
        let new: HashSet<_> = pools.new_pool().items().iter().collect();
        prop_assert_eq!(old.len(), cfg.n_pics_old());
        prop_assert_eq!(new.len(), cfg.n_pics_new());
        prop_assert!(old.is_disjoint(&new));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // 5. Running every planned trial consumes each pool exactly to zero
    #[test]
    fn full_run_consumes_every_pool_exactly(r in 1usize..=4, seed in any::<u64>()) {
        let cfg = config(r);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut inventory =
            SessionInventory::build(&cfg, pictures(cfg.n_pics_total()), &mut rng).unwrap();
        let timer = VirtualTimer::new();
        let mut frontend = SimulatedParticipant::new(ParticipantProfile::default(), seed, timer.clone());

        let mut rows = 0;
        for plan in &inventory.plan {
            let trial = Trial::prepare(plan, TrialMode::Main, &mut inventory.pools, &mut rng).unwrap();
            rows += trial
                .run(&cfg, &mut inventory.pools, &mut frontend, &timer, &mut rng)
                .unwrap()
                .len();
        }
        prop_assert_eq!(rows, 8 * 5 * r);
        let report = inventory.pools.verify();
        prop_assert!(report.is_balanced(), "{}", report);
    }
}

/// The full-length configuration plans and runs 75 trials, not 72.
#[test]
fn full_run_length_runs_seventy_five_trials() {
    let cfg = ExperimentConfig {
        run_length: RunLength::Full,
        seed: Some(2009),
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(2009);
    let inventory =
        SessionInventory::build(&cfg, pictures(cfg.n_pics_total()), &mut rng).unwrap();
    assert_eq!(inventory.plan.len(), 75);

    let timer = VirtualTimer::new();
    let session: ExperimentSession<StandardPhase, _, _> =
        ExperimentSession::new(cfg, inventory, timer.clone(), rng);
    let mut frontend = SimulatedParticipant::new(ParticipantProfile::default(), 1, timer);
    let mut log = DataLog::from_writer(Vec::new());

    let outcome = session.run(&mut frontend, &mut log).unwrap();
    assert_eq!(outcome.trials_run, 75);
    assert_eq!(outcome.records_logged, 600);
    assert!(outcome.balance.is_balanced(), "{}", outcome.balance);
}

/// One super-block: 5 trials, pools {1:8, 2:6, 3:4, 4:2}, durations 2/2/1.
#[test]
fn one_super_block_example() {
    let mut rng = StdRng::seed_from_u64(5);
    let plan = build_experiment_plan(1, DURATIONS, &mut rng).unwrap();
    assert_eq!(plan.len(), 5);
    let count = |d| plan.iter().filter(|t| t.duration_ms == d).count();
    assert_eq!((count(240), count(400), count(720)), (2, 2, 1));

    let pools = QuadrantPools::build(1, &mut rng);
    assert_eq!(pools.leftovers(), vec![(1, 8), (2, 6), (3, 4), (4, 2)]);
}
