//! Equilibrium solvers.
//!
//! Two solvers compute the same subgame-perfect equilibrium from the shared
//! model primitives:
//!
//! - [`FastSolver`]: sequential best responses, `O(n * Tmax)`.
//! - [`ExactSolver`]: the full decision tree with backward induction,
//!   exponential, used as a ground-truth oracle on small games.
//!
//! Players are interchangeable at equilibrium, so the two solvers may assign
//! the same days to different player indices. Compare their results with
//! [`plans_agree`] and [`payoffs_agree`].
//!
//! # Example
//!
//! ```
//! use dispersal_nash::model::{GameParameters, SolverConfig};
//! use dispersal_nash::solver::{plans_agree, solve_exact, solve_fast};
//!
//! let params = GameParameters::new(1, 4, 20.0, 10.0, 20.0, 30.0, 2, 2.0, 10.0, 10.0);
//! let config = SolverConfig::default();
//!
//! let fast = solve_fast(&params, &config).unwrap();
//! let exact = solve_exact(&params, &config).unwrap();
//! assert!(plans_agree(&fast.plan, &exact.plan));
//! ```

pub mod exact;
pub mod fast;
pub mod output;
pub mod validator;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    accrue, compute_survival_vector, ConfigError, DeparturePlan, GameParameters, RemainingCount,
    ResourceTrajectory, SolverConfig,
};

pub use exact::{DecisionNode, DecisionTree, ExactSolver, NodeId};
pub use fast::FastSolver;
pub use output::{InstanceReport, SolveReport};
pub use validator::{payoffs_agree, plans_agree, uniqueness_check};

/// Result of solving one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    /// Players present on each day under the equilibrium plan.
    pub remaining: RemainingCount,
    /// Departure day of every player; the horizon means "never".
    pub plan: DeparturePlan,
    /// Payoff of every player.
    pub payoffs: Vec<f64>,
}

impl Equilibrium {
    /// Resources a present player holds on each day at equilibrium.
    pub fn trajectory(&self, params: &GameParameters) -> ResourceTrajectory {
        accrue(&self.remaining, params)
    }

    /// Survival probability of every player.
    pub fn survival(&self, params: &GameParameters) -> Vec<f64> {
        compute_survival_vector(params, &self.plan, &self.trajectory(params))
    }
}

/// A procedure that computes the equilibrium of a game.
pub trait EquilibriumSolver {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Solve the game described by `params`.
    fn solve(&self, params: &GameParameters) -> Result<Equilibrium, SolveError>;
}

/// Solve with the fast sequential best-response algorithm.
pub fn solve_fast(params: &GameParameters, config: &SolverConfig) -> Result<Equilibrium, SolveError> {
    FastSolver::new(config.clone()).solve(params)
}

/// Solve with the exhaustive decision tree.
pub fn solve_exact(params: &GameParameters, config: &SolverConfig) -> Result<Equilibrium, SolveError> {
    ExactSolver::new(config.clone()).solve(params)
}

/// Errors that can occur while solving a game.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Parameters or solver configuration were rejected before solving.
    InvalidParameters(ConfigError),
    /// Two or more options share the maximal payoff.
    AmbiguousEquilibrium {
        /// Resolution step at which the tie occurred, if known.
        step: Option<usize>,
        /// Indices of the tied options (departure day, or `Tmax` for never).
        candidates: Vec<usize>,
        /// The shared maximal payoff.
        payoff: f64,
    },
    /// The exact solver was asked to expand a tree beyond its bound.
    IntractableInstance {
        /// `n * Tmax` of the instance.
        cells: usize,
        /// Configured maximum.
        limit: usize,
    },
    /// Backward induction reached a leaf whose payoffs were never evaluated.
    UnevaluatedLeaf {
        /// Arena index of the offending node.
        node: usize,
    },
}

impl SolveError {
    /// Attach the resolution step to an ambiguity error.
    pub fn at_step(self, at: usize) -> Self {
        match self {
            SolveError::AmbiguousEquilibrium { candidates, payoff, .. } => {
                SolveError::AmbiguousEquilibrium {
                    step: Some(at),
                    candidates,
                    payoff,
                }
            }
            other => other,
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(err: ConfigError) -> Self {
        SolveError::InvalidParameters(err)
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidParameters(err) => write!(f, "Invalid parameters: {}", err),
            SolveError::AmbiguousEquilibrium {
                step,
                candidates,
                payoff,
            } => {
                write!(f, "Ambiguous equilibrium: options {:?} tie at payoff {}", candidates, payoff)?;
                if let Some(step) = step {
                    write!(f, " (step {})", step)?;
                }
                Ok(())
            }
            SolveError::IntractableInstance { cells, limit } => write!(
                f,
                "Instance too large for the exact solver: n * Tmax = {} exceeds {}",
                cells, limit
            ),
            SolveError::UnevaluatedLeaf { node } => {
                write!(f, "Decision tree node {} has no evaluated payoffs", node)
            }
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::InvalidParameters(err) => Some(err),
            _ => None,
        }
    }
}
