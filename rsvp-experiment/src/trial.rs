use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use rsvp_core::{
    PictureId, Placement, Quadrant, ResponseKey, Screen, TestRecord, TrialState, PRACTICE_NEW,
    PRACTICE_OLD, RSVP_FRAME_COUNT, TESTED_NEW_PER_TRIAL, TESTED_OLD_PER_TRIAL,
};
use rsvp_timing::Timer;
use tracing::debug;

use crate::config::ExperimentConfig;
use crate::inventory::SessionPools;
use crate::plan::TrialPlan;
use crate::pool::PoolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialMode {
    /// Placeholders only; no pool is touched and nothing is logged.
    Practice,
    Main,
}

/// A picture that appeared in one of the trial's RSVP frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownPicture {
    pub picture: PictureId,
    pub n_value: u8,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub picture: PictureId,
    pub is_old: bool,
    /// Only set for old pictures.
    pub shown: Option<(u8, Quadrant)>,
}

/// One trial from fixation to the last test response.
#[derive(Debug, Clone)]
pub struct Trial {
    pub plan: TrialPlan,
    pub mode: TrialMode,
    pub state: TrialState,
    /// Lead mask, six content frames, trail mask.
    pub frames: Vec<Screen>,
    pub shown: Vec<ShownPicture>,
    pub test_items: Vec<TestItem>,
}

impl Trial {
    /// Builds all eight RSVP frames, popping one quadrant combination per
    /// non-empty content frame and one old picture per slot.
    pub fn prepare<R: Rng + ?Sized>(
        plan: &TrialPlan,
        mode: TrialMode,
        pools: &mut SessionPools,
        rng: &mut R,
    ) -> Result<Self, PoolError> {
        let mut frames = Vec::with_capacity(RSVP_FRAME_COUNT);
        let mut shown = Vec::new();
        frames.push(Screen::mask_only());

        for &n in &plan.n_values {
            let quadrants = match (n, mode) {
                (0, _) => Vec::new(),
                (_, TrialMode::Practice) => sample_quadrants(n, rng)?,
                (_, TrialMode::Main) => pools.quadrants.pop(n)?,
            };

            let mut pictures = Vec::with_capacity(quadrants.len());
            for quadrant in quadrants {
                let picture = match mode {
                    TrialMode::Practice => PictureId::from(PRACTICE_OLD),
                    TrialMode::Main => pools.pictures.pop_old().map_err(|e| e.in_frame(n))?,
                };
                shown.push(ShownPicture {
                    picture: picture.clone(),
                    n_value: n,
                    quadrant,
                });
                pictures.push(Placement { quadrant, picture });
            }
            frames.push(Screen::Rsvp { pictures });
        }

        frames.push(Screen::mask_only());

        Ok(Self {
            plan: plan.clone(),
            mode,
            state: TrialState::Fixation,
            frames,
            shown,
            test_items: Vec::new(),
        })
    }

    /// Four random shown pictures plus four fresh distractors, in random order.
    /// Shown pictures that are not picked are dropped.
    pub fn build_test_items<R: Rng + ?Sized>(
        &mut self,
        pools: &mut SessionPools,
        rng: &mut R,
    ) -> Result<(), PoolError> {
        self.shown.shuffle(rng);
        let mut items: Vec<TestItem> = self
            .shown
            .iter()
            .take(TESTED_OLD_PER_TRIAL)
            .map(|s| TestItem {
                picture: s.picture.clone(),
                is_old: true,
                shown: Some((s.n_value, s.quadrant)),
            })
            .collect();

        for _ in 0..TESTED_NEW_PER_TRIAL {
            let picture = match self.mode {
                TrialMode::Practice => PictureId::from(PRACTICE_NEW),
                TrialMode::Main => pools.pictures.pop_new()?,
            };
            items.push(TestItem {
                picture,
                is_old: false,
                shown: None,
            });
        }

        items.shuffle(rng);
        self.test_items = items;
        Ok(())
    }

    /// Drives the trial state machine to `Done` and returns one record per
    /// tested picture (none for practice trials).
    pub fn run<F, T, R>(
        mut self,
        config: &ExperimentConfig,
        pools: &mut SessionPools,
        frontend: &mut F,
        timer: &T,
        rng: &mut R,
    ) -> Result<Vec<TestRecord>>
    where
        F: crate::Frontend + ?Sized,
        T: Timer,
        R: Rng + ?Sized,
    {
        let mut records = Vec::new();
        debug!(trial_id = self.plan.trial_id, duration_ms = self.plan.duration_ms, n_values = ?self.plan.n_values, "trial started");

        loop {
            match self.state {
                TrialState::Fixation => {
                    frontend.present(&Screen::Fixation)?;
                    timer.wait_ms(config.fixation_ms);
                }
                TrialState::RsvpFrame(i) => {
                    frontend.present(&self.frames[i])?;
                    timer.wait_ms(self.plan.duration_ms);
                }
                TrialState::PostRsvpPause => {
                    frontend.present(&Screen::Blank)?;
                    timer.wait_ms(config.test_pause_ms);
                    self.build_test_items(pools, rng)?;
                }
                TrialState::TestItem(i) => {
                    let Some(item) = self.test_items.get(i) else {
                        // fewer shown pictures than test slots; only possible
                        // with a hand-written plan
                        self.state = TrialState::Done;
                        continue;
                    };
                    frontend.present(&Screen::TestPicture(item.picture.clone()))?;
                    timer.wait_ms(config.test_picture_ms);
                    frontend.present(&Screen::Blank)?;

                    let response = frontend.wait_key(&ResponseKey::BOTH)?;
                    if self.mode == TrialMode::Main {
                        records.push(TestRecord {
                            trial_id: self.plan.trial_id,
                            duration_ms: self.plan.duration_ms,
                            test_pic_file: item.picture.to_string(),
                            is_old: item.is_old,
                            n_value: item.shown.map(|(n, _)| n),
                            quadrant: item.shown.map(|(_, q)| q.number()),
                            response_key: response.key.code(),
                            rt_ms: response.rt_ms,
                            correct: response.key.is_correct_for(item.is_old),
                        });
                    }
                }
                TrialState::Done => break,
            }
            self.state = self.state.next();
        }

        debug!(trial_id = self.plan.trial_id, records = records.len(), "trial complete");
        Ok(records)
    }
}

/// `n` distinct quadrants in random order, for practice frames.
fn sample_quadrants<R: Rng + ?Sized>(n: u8, rng: &mut R) -> Result<Vec<Quadrant>, PoolError> {
    let n = usize::from(n);
    if n > Quadrant::ALL.len() {
        return Err(PoolError::UnknownGroupSize(n as u8));
    }
    let mut all = Quadrant::ALL.to_vec();
    all.shuffle(rng);
    all.truncate(n);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pictures::PicturePools;
    use crate::plan::practice_plan;
    use crate::quadrants::QuadrantPools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rsvp_core::Response;
    use rsvp_timing::VirtualTimer;
    use std::collections::HashSet;

    /// Says "yes" to everything and remembers what it was shown.
    #[derive(Default)]
    struct AlwaysYes {
        screens: Vec<Screen>,
    }

    impl crate::Frontend for AlwaysYes {
        fn present(&mut self, screen: &Screen) -> Result<()> {
            self.screens.push(screen.clone());
            Ok(())
        }
        fn wait_key(&mut self, _accepted: &[ResponseKey]) -> Result<Response> {
            Ok(Response {
                key: ResponseKey::Yes,
                rt_ms: 500,
            })
        }
        fn wait_continue(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn pools(rng: &mut StdRng) -> SessionPools {
        let files = (0..60)
            .map(|i| PictureId::from(format!("img{i}.jpg")))
            .collect();
        SessionPools {
            quadrants: QuadrantPools::build(1, rng),
            pictures: PicturePools::allocate(files, 40, 20, rng),
        }
    }

    fn main_trial() -> TrialPlan {
        TrialPlan {
            trial_id: 1,
            duration_ms: 240,
            n_values: [0, 4, 1, 0, 2, 1],
        }
    }

    #[test]
    fn prepare_pops_one_combo_per_frame_and_one_picture_per_slot() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut pools = pools(&mut rng);
        let trial = Trial::prepare(&main_trial(), TrialMode::Main, &mut pools, &mut rng).unwrap();

        assert_eq!(trial.frames.len(), RSVP_FRAME_COUNT);
        assert_eq!(trial.frames[0], Screen::mask_only());
        assert_eq!(trial.frames[7], Screen::mask_only());
        assert_eq!(trial.shown.len(), 8);
        assert_eq!(pools.quadrants.leftovers(), vec![(1, 6), (2, 5), (3, 4), (4, 1)]);
        assert_eq!(pools.pictures.old().len(), 32);

        let Screen::Rsvp { pictures } = &trial.frames[2] else {
            panic!("expected an RSVP frame");
        };
        assert_eq!(pictures.len(), 4);
        let quadrants: HashSet<_> = pictures.iter().map(|p| p.quadrant).collect();
        assert_eq!(quadrants.len(), 4);
    }

    #[test]
    fn main_trial_logs_four_old_and_four_new() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pools = pools(&mut rng);
        let config = ExperimentConfig::default();
        let timer = VirtualTimer::new();
        let mut frontend = AlwaysYes::default();

        let trial = Trial::prepare(&main_trial(), TrialMode::Main, &mut pools, &mut rng).unwrap();
        let shown: HashSet<_> = trial.shown.iter().map(|s| s.picture.clone()).collect();
        let records = trial
            .run(&config, &mut pools, &mut frontend, &timer, &mut rng)
            .unwrap();

        assert_eq!(records.len(), 8);
        let old: Vec<_> = records.iter().filter(|r| r.is_old).collect();
        assert_eq!(old.len(), 4);
        for r in &old {
            assert!(shown.contains(&PictureId::from(r.test_pic_file.as_str())));
            assert!(r.n_value.is_some() && r.quadrant.is_some());
            assert!(r.correct);
        }
        for r in records.iter().filter(|r| !r.is_old) {
            assert_eq!((r.n_value, r.quadrant), (None, None));
            assert!(!r.correct);
        }
        assert_eq!(pools.pictures.new_pool().len(), 16);

        // fixation 500 + 8 * 240 + pause 200 + 8 * 400
        assert_eq!(timer.now(), 5_820 * 1_000_000);
        // fixation, 8 frames, blank, 8 * (picture + blank)
        assert_eq!(frontend.screens.len(), 1 + 8 + 1 + 16);
    }

    #[test]
    fn practice_touches_no_pool_and_logs_nothing() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut pools = pools(&mut rng);
        let before = pools.clone();
        let config = ExperimentConfig::default();
        let timer = VirtualTimer::new();
        let mut frontend = AlwaysYes::default();

        for plan in practice_plan(400) {
            let trial = Trial::prepare(&plan, TrialMode::Practice, &mut pools, &mut rng).unwrap();
            let records = trial
                .run(&config, &mut pools, &mut frontend, &timer, &mut rng)
                .unwrap();
            assert!(records.is_empty());
        }
        assert_eq!(pools, before);
        assert!(frontend
            .screens
            .contains(&Screen::TestPicture(PictureId::from(PRACTICE_NEW))));
    }

    #[test]
    fn exhausted_pool_aborts_the_trial() {
        let mut rng = StdRng::seed_from_u64(44);
        let mut pools = SessionPools {
            quadrants: QuadrantPools::build(1, &mut rng),
            pictures: PicturePools::allocate(Vec::new(), 0, 0, &mut rng),
        };
        let err = Trial::prepare(&main_trial(), TrialMode::Main, &mut pools, &mut rng).unwrap_err();
        // first non-empty frame of the plan shows four pictures
        assert_eq!(
            err,
            PoolError::ExhaustedInFrame {
                pool: crate::pool::PoolLabel::OldPictures,
                group_size: 4
            }
        );
    }
}
