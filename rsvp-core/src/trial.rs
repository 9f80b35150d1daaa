use serde::{Deserialize, Serialize};

/// Lead mask, six content frames, trail mask.
pub const RSVP_FRAME_COUNT: usize = 8;
/// Content frames per trial, one group size each.
pub const CONTENT_FRAME_COUNT: usize = 6;
/// Pictures tested after each trial: four old, four new.
pub const TEST_ITEM_COUNT: usize = 8;
pub const TESTED_OLD_PER_TRIAL: usize = 4;
pub const TESTED_NEW_PER_TRIAL: usize = 4;

/// Trial state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Fixation,
    RsvpFrame(usize),
    PostRsvpPause,
    TestItem(usize),
    Done,
}

impl TrialState {
    pub fn next(self) -> Self {
        match self {
            TrialState::Fixation => TrialState::RsvpFrame(0),
            TrialState::RsvpFrame(i) if i + 1 < RSVP_FRAME_COUNT => TrialState::RsvpFrame(i + 1),
            TrialState::RsvpFrame(_) => TrialState::PostRsvpPause,
            TrialState::PostRsvpPause => TrialState::TestItem(0),
            TrialState::TestItem(i) if i + 1 < TEST_ITEM_COUNT => TrialState::TestItem(i + 1),
            TrialState::TestItem(_) | TrialState::Done => TrialState::Done,
        }
    }
}

/// The two keys accepted during the memory test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    Yes,
    No,
}

impl ResponseKey {
    pub const BOTH: [ResponseKey; 2] = [ResponseKey::Yes, ResponseKey::No];

    /// Key code written to the data log (ASCII `y` / `n`).
    pub fn code(self) -> u32 {
        match self {
            ResponseKey::Yes => 121,
            ResponseKey::No => 110,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            121 => Some(ResponseKey::Yes),
            110 => Some(ResponseKey::No),
            _ => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'y' => Some(ResponseKey::Yes),
            'n' => Some(ResponseKey::No),
            _ => None,
        }
    }

    /// "yes" is correct for old pictures, "no" for new ones.
    pub fn is_correct_for(self, is_old: bool) -> bool {
        matches!(
            (self, is_old),
            (ResponseKey::Yes, true) | (ResponseKey::No, false)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub key: ResponseKey,
    pub rt_ms: u64,
}

/// One data-log row per tested picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub trial_id: i32,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub test_pic_file: String,
    #[serde(with = "flag")]
    pub is_old: bool,
    #[serde(with = "not_applicable")]
    pub n_value: Option<u8>,
    #[serde(with = "not_applicable")]
    pub quadrant: Option<u8>,
    pub response_key: u32,
    #[serde(rename = "rt")]
    pub rt_ms: u64,
    #[serde(with = "flag")]
    pub correct: bool,
}

impl TestRecord {
    pub fn said_yes(&self) -> bool {
        ResponseKey::from_code(self.response_key) == Some(ResponseKey::Yes)
    }
}

/// Booleans are logged as `1` / `0`.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(d)? != 0)
    }
}

/// Fields that do not apply to new pictures are logged as `N/A`.
mod not_applicable {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const NA: &str = "N/A";

    pub fn serialize<S: Serializer>(value: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_u8(*v),
            None => s.serialize_str(NA),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.trim();
        if raw == NA {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("expected a number or {NA}, got {raw:?}: {e}")))
    }
}
