//! Game model: parameters, presence counts, resource accrual and payoffs.
//!
//! Everything in this module is a pure function of its inputs. The solvers
//! in [`crate::solver`] combine these primitives; keeping them shared is
//! what makes the fast and exact solvers comparable.
//!
//! # Model
//!
//! `n` players share a pool that receives `r` resources per day, split among
//! those present. Each player picks a day to depart (or never departs):
//!
//! - leaving early forfeits pool income and makes transit riskier;
//! - leaving late shortens the time left to reproduce after transit;
//! - every departure raises the share of those who remain.
//!
//! Day indices run over `0..Tmax`; the value `Tmax` in a plan means the
//! player never departs.

pub mod config;
pub mod payoff;
pub mod plan;
pub mod resources;

pub use config::{ConfigError, GameParameters, SolverConfig, TiePolicy};
pub use payoff::{
    candidate_payoffs, compute_survival_vector, evaluate_plan, payoff_if_departs,
    payoff_if_stays, payoff_vector, survival_probability, transit_time,
};
pub use plan::{DeparturePlan, RemainingCount};
pub use resources::{accrue, ResourceTrajectory};
