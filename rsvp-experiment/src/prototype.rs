//! The fixed five-trial template every super-block repeats.

use rsvp_core::CONTENT_FRAME_COUNT;

pub const TRIALS_PER_SUPER_BLOCK: usize = 5;
pub const PICTURES_PER_TRIAL: usize = 8;
pub const MAX_GROUP_SIZE: u8 = 4;

/// Group sizes of the six content frames of one trial.
pub type FrameSizes = [u8; CONTENT_FRAME_COUNT];

/// Per super-block this uses 8 frames of n=1, 6 of n=2, 4 of n=3, 2 of n=4
/// and 10 mask-only frames. Each row adds up to 8 pictures.
pub fn super_block_prototype() -> [FrameSizes; TRIALS_PER_SUPER_BLOCK] {
    [
        [4, 2, 1, 1, 0, 0],
        [4, 2, 1, 1, 0, 0],
        [3, 3, 1, 1, 0, 0],
        [3, 2, 2, 1, 0, 0],
        [3, 2, 2, 1, 0, 0],
    ]
}

/// How many frames of group size `n` one super-block contains.
pub fn frames_per_super_block(n: u8) -> usize {
    super_block_prototype()
        .iter()
        .flatten()
        .filter(|&&size| size == n)
        .count()
}
