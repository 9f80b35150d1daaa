pub mod phase;
pub mod stimulus;
pub mod trial;

pub use phase::{Phase, StandardPhase};
pub use stimulus::{PictureId, Placement, Quadrant, Screen, PRACTICE_NEW, PRACTICE_OLD};
pub use trial::{
    Response, ResponseKey, TestRecord, TrialState, CONTENT_FRAME_COUNT, RSVP_FRAME_COUNT,
    TESTED_NEW_PER_TRIAL, TESTED_OLD_PER_TRIAL, TEST_ITEM_COUNT,
};
