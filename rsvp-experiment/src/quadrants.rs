use rand::Rng;
use rsvp_core::Quadrant;
use tracing::info;

use crate::pool::{Pool, PoolError, PoolLabel};
use crate::prototype::MAX_GROUP_SIZE;

pub type QuadrantCombo = Vec<Quadrant>;

/// Copies of each `k`-combination per super-block, chosen so that
/// `multiplicity(k) * C(4, k)` equals the prototype's frame count for size `k`.
pub fn multiplicity(group_size: u8) -> usize {
    match group_size {
        1 => 2,
        2 => 1,
        3 => 1,
        4 => 2,
        _ => 0,
    }
}

/// All `k`-element subsets of `items`, in lexicographic order.
pub fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &head) in items.iter().enumerate() {
        for mut tail in combinations(&items[i + 1..], k - 1) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

/// One pool of quadrant combinations per group size 1..=4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantPools {
    pools: Vec<Pool<QuadrantCombo>>,
}

impl QuadrantPools {
    /// Builds the pools for `super_blocks` repetitions and shuffles each once.
    pub fn build<R: Rng + ?Sized>(super_blocks: usize, rng: &mut R) -> Self {
        info!("Generating master quadrant pools");
        let pools: Vec<_> = (1..=MAX_GROUP_SIZE)
            .map(|n| {
                let combos = combinations(&Quadrant::ALL, usize::from(n));
                let copies = super_blocks * multiplicity(n);
                let mut items = Vec::with_capacity(combos.len() * copies);
                for _ in 0..copies {
                    items.extend(combos.iter().cloned());
                }
                Pool::shuffled(PoolLabel::Quadrants { group_size: n }, items, rng)
            })
            .collect();

        for (n, pool) in (1..=MAX_GROUP_SIZE).zip(&pools) {
            info!(
                group_size = n,
                size = pool.len(),
                expected = Self::expected_len(n, super_blocks),
                "quadrant pool built"
            );
        }

        Self { pools }
    }

    /// `super_blocks * multiplicity(k) * C(4, k)`.
    pub fn expected_len(group_size: u8, super_blocks: usize) -> usize {
        super_blocks
            * multiplicity(group_size)
            * combinations(&Quadrant::ALL, usize::from(group_size)).len()
    }

    pub fn pop(&mut self, group_size: u8) -> Result<QuadrantCombo, PoolError> {
        self.pool_mut(group_size)?.pop()
    }

    pub fn len(&self, group_size: u8) -> usize {
        self.pool(group_size).map_or(0, Pool::len)
    }

    pub fn pool(&self, group_size: u8) -> Result<&Pool<QuadrantCombo>, PoolError> {
        Self::index(group_size).map(|i| &self.pools[i])
    }

    fn pool_mut(&mut self, group_size: u8) -> Result<&mut Pool<QuadrantCombo>, PoolError> {
        Self::index(group_size).map(|i| &mut self.pools[i])
    }

    fn index(group_size: u8) -> Result<usize, PoolError> {
        match group_size {
            1..=MAX_GROUP_SIZE => Ok(usize::from(group_size) - 1),
            _ => Err(PoolError::UnknownGroupSize(group_size)),
        }
    }

    /// `(group_size, items left)` for every pool.
    pub fn leftovers(&self) -> Vec<(u8, usize)> {
        (1..=MAX_GROUP_SIZE)
            .zip(&self.pools)
            .map(|(n, pool)| (n, pool.len()))
            .collect()
    }

    pub fn all_empty(&self) -> bool {
        self.pools.iter().all(Pool::is_empty)
    }
}
