use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Names each pool in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolLabel {
    Quadrants { group_size: u8 },
    OldPictures,
    NewPictures,
    Durations,
}

impl fmt::Display for PoolLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolLabel::Quadrants { group_size } => write!(f, "quadrant pool N={group_size}"),
            PoolLabel::OldPictures => f.write_str("'old' picture pool"),
            PoolLabel::NewPictures => f.write_str("'new' picture pool"),
            PoolLabel::Durations => f.write_str("duration pool"),
        }
    }
}

/// Running out of a pool means the balancing arithmetic is wrong; callers abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("ran out of items in the {pool}; the balancing logic is flawed")]
    Exhausted { pool: PoolLabel },
    #[error("ran out of items in the {pool} while filling an N={group_size} frame; the balancing logic is flawed")]
    ExhaustedInFrame { pool: PoolLabel, group_size: u8 },
    #[error("no quadrant pool exists for group size N={0}")]
    UnknownGroupSize(u8),
}

impl PoolError {
    /// Attaches the frame group size to an exhaustion from a picture pool.
    pub fn in_frame(self, group_size: u8) -> Self {
        match self {
            PoolError::Exhausted { pool } => PoolError::ExhaustedInFrame { pool, group_size },
            other => other,
        }
    }
}

/// Finite multiset consumed one item at a time and never refilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool<T> {
    label: PoolLabel,
    items: Vec<T>,
}

impl<T> Pool<T> {
    pub fn new(label: PoolLabel, items: Vec<T>) -> Self {
        Self { label, items }
    }

    pub fn shuffled<R: Rng + ?Sized>(label: PoolLabel, mut items: Vec<T>, rng: &mut R) -> Self {
        items.shuffle(rng);
        Self { label, items }
    }

    /// Removes the item at the back.
    pub fn pop(&mut self) -> Result<T, PoolError> {
        self.items
            .pop()
            .ok_or(PoolError::Exhausted { pool: self.label })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}
