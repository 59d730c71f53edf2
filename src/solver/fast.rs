//! Sequential best-response solver.
//!
//! A player's payoff from departing on day `t` depends only on how many
//! players were present on days before `t`. Resolving players in reverse
//! order of influence, each best response can therefore be computed from the
//! departures committed so far and never needs revisiting:
//!
//! 1. recompute the resource trajectory from the current counts;
//! 2. pick the best of the `Tmax + 1` options (each day, or never);
//! 3. commit the choice by removing the player from the pool from that day on.
//!
//! After `n` steps the counts alone describe the equilibrium. The plan is
//! read back by histogram inversion and costs `O(n * Tmax)` overall, against
//! `O((Tmax + 1)^n)` for the exhaustive tree.

use crate::model::{
    accrue, candidate_payoffs, payoff_vector, GameParameters, RemainingCount, SolverConfig,
    TiePolicy,
};
use crate::solver::validator::{first_argmax, uniqueness_check};
use crate::solver::{Equilibrium, EquilibriumSolver, SolveError};

/// Linear-time equilibrium solver.
///
/// # Example
/// ```
/// use dispersal_nash::model::{GameParameters, SolverConfig};
/// use dispersal_nash::solver::FastSolver;
///
/// let params = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);
/// let eq = FastSolver::new(SolverConfig::default()).solve(&params).unwrap();
/// assert_eq!(eq.plan.days(), &[3, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FastSolver {
    config: SolverConfig,
}

impl FastSolver {
    /// Create a fast solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the game.
    pub fn solve(&self, params: &GameParameters) -> Result<Equilibrium, SolveError> {
        params.validate()?;
        self.config.validate()?;

        let mut remaining = RemainingCount::full(params.players, params.horizon);

        for step in 0..params.players {
            let day = self.best_response(&remaining, params, step)?;
            log::debug!("step {}: departs on day {} of {}", step, day, params.horizon);
            remaining.commit(day);
        }

        debug_assert!(remaining.is_non_increasing());

        let plan = remaining.to_plan(params.players);
        let payoffs = payoff_vector(&plan, &remaining, params);

        Ok(Equilibrium {
            remaining,
            plan,
            payoffs,
        })
    }

    /// Best departure day for the player resolved at `step`, given the
    /// departures committed so far. Returns `Tmax` for "never".
    pub fn best_response(
        &self,
        remaining: &RemainingCount,
        params: &GameParameters,
        step: usize,
    ) -> Result<usize, SolveError> {
        let trajectory = accrue(remaining, params);
        let candidates = candidate_payoffs(&trajectory, params);

        if let Err(err) = uniqueness_check(&candidates, &self.config) {
            let err = err.at_step(step);
            match self.config.tie_policy {
                TiePolicy::Reject => return Err(err),
                TiePolicy::Warn => log::warn!("{}; keeping the earliest day", err),
            }
        }

        Ok(first_argmax(&candidates))
    }
}

impl EquilibriumSolver for FastSolver {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn solve(&self, params: &GameParameters) -> Result<Equilibrium, SolveError> {
        FastSolver::solve(self, params)
    }
}
