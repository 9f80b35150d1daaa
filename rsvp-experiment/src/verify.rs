use std::fmt;

use tracing::{info, warn};

use crate::pictures::PicturePools;
use crate::quadrants::QuadrantPools;

/// Items left in each pool after the last trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReport {
    pub quadrant_leftovers: Vec<(u8, usize)>,
    pub old_left: usize,
    pub new_left: usize,
}

impl BalanceReport {
    pub fn quadrants_empty(&self) -> bool {
        self.quadrant_leftovers.iter().all(|&(_, left)| left == 0)
    }

    pub fn is_balanced(&self) -> bool {
        self.quadrants_empty() && self.old_left == 0 && self.new_left == 0
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_balanced() {
            return f.write_str("all pools empty; every balanced item was used exactly once");
        }
        let mut parts = Vec::new();
        for &(n, left) in &self.quadrant_leftovers {
            if left > 0 {
                parts.push(format!("pool N={n}: {left} left"));
            }
        }
        if self.old_left > 0 {
            parts.push(format!("'old' pictures: {} left", self.old_left));
        }
        if self.new_left > 0 {
            parts.push(format!("'new' pictures: {} left", self.new_left));
        }
        write!(f, "unbalanced: {}", parts.join(", "))
    }
}

/// Post-run check that every pool was consumed exactly. Diagnostic only.
pub fn verify_balance(quadrants: &QuadrantPools, pictures: &PicturePools) -> BalanceReport {
    let report = BalanceReport {
        quadrant_leftovers: quadrants.leftovers(),
        old_left: pictures.old().len(),
        new_left: pictures.new_pool().len(),
    };

    if report.quadrants_empty() {
        info!("VERIFICATION SUCCESS: all master quadrant pools are empty");
    } else {
        for &(n, left) in &report.quadrant_leftovers {
            if left > 0 {
                warn!(group_size = n, left, "VERIFICATION FAILED: quadrant pool not empty");
            }
        }
    }
    if report.old_left > 0 {
        warn!(left = report.old_left, "VERIFICATION FAILED: 'old' pictures left unused");
    }
    if report.new_left > 0 {
        warn!(left = report.new_left, "VERIFICATION FAILED: 'new' pictures left unused");
    }
    report
}
