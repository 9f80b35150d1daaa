use std::collections::HashSet;
use std::ops::RangeInclusive;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsvp_core::{PictureId, Response, ResponseKey, Screen};
use rsvp_timing::Timer;

use crate::frontend::Frontend;

/// Answer tendencies of a simulated participant.
#[derive(Debug, Clone)]
pub struct ParticipantProfile {
    /// P("yes") for a picture that was in the stream.
    pub hit_rate: f64,
    /// P("yes") for a picture that was not.
    pub false_alarm_rate: f64,
    pub rt_range_ms: RangeInclusive<u64>,
}

impl Default for ParticipantProfile {
    fn default() -> Self {
        Self {
            hit_rate: 0.6,
            false_alarm_rate: 0.15,
            rt_range_ms: 350..=1200,
        }
    }
}

/// Headless frontend that watches the RSVP stream and answers the memory
/// test from its profile. Reaction times pass on `timer`.
pub struct SimulatedParticipant<T: Timer> {
    profile: ParticipantProfile,
    rng: StdRng,
    timer: T,
    seen: HashSet<PictureId>,
    test_picture: Option<PictureId>,
    pub responses: usize,
}

impl<T: Timer> SimulatedParticipant<T> {
    pub fn new(profile: ParticipantProfile, seed: u64, timer: T) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
            timer,
            seen: HashSet::new(),
            test_picture: None,
            responses: 0,
        }
    }
}

impl<T: Timer> Frontend for SimulatedParticipant<T> {
    fn present(&mut self, screen: &Screen) -> Result<()> {
        match screen {
            // a new trial starts with fixation; forget the previous stream
            Screen::Fixation => self.seen.clear(),
            Screen::Rsvp { pictures } => {
                self.seen
                    .extend(pictures.iter().map(|p| p.picture.clone()));
            }
            Screen::TestPicture(picture) => self.test_picture = Some(picture.clone()),
            Screen::Blank | Screen::Text { .. } => {}
        }
        Ok(())
    }

    fn wait_key(&mut self, accepted: &[ResponseKey]) -> Result<Response> {
        let was_shown = self
            .test_picture
            .take()
            .is_some_and(|picture| self.seen.contains(&picture));
        let p_yes = if was_shown {
            self.profile.hit_rate
        } else {
            self.profile.false_alarm_rate
        };
        let key = if self.rng.random_bool(p_yes.clamp(0.0, 1.0)) {
            ResponseKey::Yes
        } else {
            ResponseKey::No
        };
        ensure!(accepted.contains(&key), "{key:?} is not an accepted key here");
        ensure!(
            !self.profile.rt_range_ms.is_empty(),
            "empty reaction time range {:?}",
            self.profile.rt_range_ms
        );

        let rt_ms = self.rng.random_range(self.profile.rt_range_ms.clone());
        self.timer.wait_ms(rt_ms);
        self.responses += 1;
        Ok(Response { key, rt_ms })
    }

    fn wait_continue(&mut self) -> Result<()> {
        Ok(())
    }
}
