//! Resource accrual of a player that is still present in the pool.
//!
//! The pool receives `r` per day, split evenly among the players present.
//! A player's holdings on day `t` are `Rmin` plus every share collected on
//! days `0..t`:
//!
//! ```text
//! R[0] = Rmin
//! R[t] = R[t-1] + r / remaining[t-1]     (remaining[t-1] > 0)
//! R[t] = R[t-1]                          (remaining[t-1] = 0)
//! ```
//!
//! Accrual is indexed by the previous day's count, so a player leaving on
//! day `t` has collected exactly the shares of the days it was present.

use serde::{Deserialize, Serialize};

use crate::model::config::GameParameters;
use crate::model::plan::RemainingCount;

/// Cumulative resources of a present player on each day `0..Tmax`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTrajectory(Vec<f64>);

impl ResourceTrajectory {
    /// Resources held on each day.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Resources held on `day`.
    pub fn at(&self, day: usize) -> f64 {
        self.0[day]
    }

    /// Number of days covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the trajectory is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First day on which holdings reach `r_max`, or the horizon if never.
    pub fn rmax_index(&self, r_max: f64) -> usize {
        self.0
            .iter()
            .position(|&resources| resources >= r_max)
            .unwrap_or(self.0.len())
    }
}

/// Compute the resource trajectory for the given presence counts.
///
/// A day with nobody present accrues nothing; holdings carry forward.
pub fn accrue(remaining: &RemainingCount, params: &GameParameters) -> ResourceTrajectory {
    let counts = remaining.counts();
    let mut values = Vec::with_capacity(counts.len());
    let mut collected = 0.0;

    for day in 0..counts.len() {
        if day > 0 {
            match counts[day - 1] {
                0 => log::trace!("no players present on day {}, carrying resources", day - 1),
                present => collected += params.r / present as f64,
            }
        }
        values.push(params.r_min + collected);
    }

    ResourceTrajectory(values)
}
