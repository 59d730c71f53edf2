//! Departure plans and per-day presence counts.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Number of players still present in the pool on each day `0..Tmax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemainingCount(Vec<usize>);

impl RemainingCount {
    /// Every one of `players` present on every day of the horizon.
    pub fn full(players: usize, horizon: usize) -> Self {
        Self(vec![players; horizon])
    }

    /// Build counts directly from per-day values.
    pub fn from_counts(counts: Vec<usize>) -> Self {
        Self(counts)
    }

    /// Counts implied by a complete plan: a player leaving on day `d` is
    /// present on every day `t < d`.
    pub fn from_plan(plan: &DeparturePlan) -> Self {
        let counts = (0..plan.horizon())
            .map(|day| plan.days().iter().filter(|&&d| d > day).count())
            .collect();
        Self(counts)
    }

    /// Commit one departure on `day`: that player is absent from `day` on.
    ///
    /// A departure day at or beyond the horizon ("never") changes nothing.
    pub fn commit(&mut self, day: usize) {
        for count in self.0.iter_mut().skip(day) {
            *count = count.saturating_sub(1);
        }
    }

    /// Recover a plan by histogram inversion.
    ///
    /// Once every player has committed, players are interchangeable and the
    /// number of days on which more than `i` players remain is the departure
    /// day of rank `i`. Rank 0 receives the latest day.
    pub fn to_plan(&self, players: usize) -> DeparturePlan {
        let days = (0..players)
            .map(|rank| self.0.iter().filter(|&&count| count > rank).count())
            .collect();
        DeparturePlan::new(days, self.0.len())
    }

    /// Whether the counts never increase from one day to the next.
    pub fn is_non_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] >= w[1])
    }

    /// Per-day counts.
    pub fn counts(&self) -> &[usize] {
        &self.0
    }

    /// Horizon covered by these counts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the horizon is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Departure day of every player. A day equal to the horizon means the
/// player never departs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeparturePlan {
    days: Vec<usize>,
    horizon: usize,
}

impl DeparturePlan {
    /// Create a plan. Days beyond the horizon are clamped to "never".
    pub fn new(days: Vec<usize>, horizon: usize) -> Self {
        let days = days.into_iter().map(|d| d.min(horizon)).collect();
        Self { days, horizon }
    }

    /// Departure days, indexed by player.
    pub fn days(&self) -> &[usize] {
        &self.days
    }

    /// Horizon the plan was made for.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the plan has no players.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Whether `player` stays for the whole horizon.
    pub fn never_departs(&self, player: usize) -> bool {
        self.days[player] >= self.horizon
    }

    /// Number of players departing on each day, "never" keyed by the horizon.
    pub fn day_histogram(&self) -> FxHashMap<usize, usize> {
        let mut histogram = FxHashMap::default();
        for &day in &self.days {
            *histogram.entry(day).or_insert(0) += 1;
        }
        histogram
    }
}

impl fmt::Display for DeparturePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self
            .days
            .iter()
            .map(|&d| if d >= self.horizon { "never".to_string() } else { d.to_string() })
            .collect();
        write!(f, "[{}]", days.join(", "))
    }
}
