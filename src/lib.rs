//! # Dispersal Nash
//!
//! Subgame-perfect equilibria of a sequential dispersal-timing game.
//!
//! `n` individuals share a resource pool. Each chooses a day to leave and
//! begin transit, or never leaves. Staying longer collects more of the pool,
//! which improves the odds of surviving transit, but leaves less time to
//! reproduce afterwards. Every departure enlarges the share of those who
//! remain, so each player's best day depends on the others.
//!
//! ## Features
//!
//! - **Fast solver**: sequential best responses in `O(n * Tmax)`
//! - **Exact solver**: full decision tree with backward induction, used as a
//!   ground-truth oracle on small games
//! - **Tie detection**: indifferent best responses are surfaced as
//!   `AmbiguousEquilibrium` instead of being broken silently
//! - **JSON I/O**: parameter files and solve reports via serde
//!
//! ## Quick Start
//!
//! ```
//! use dispersal_nash::model::{GameParameters, SolverConfig};
//! use dispersal_nash::solver::solve_fast;
//!
//! let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
//! let eq = solve_fast(&params, &SolverConfig::default()).unwrap();
//!
//! assert_eq!(eq.plan.days(), &[1, 0, 0]);
//! assert!((eq.payoffs[0] - 16.5).abs() < 1e-9);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    model (pure functions)                    │
//! │  GameParameters   RemainingCount   accrue   payoffs/survival │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!               ┌───────────────┴───────────────┐
//!               ▼                               ▼
//!        ┌─────────────┐                 ┌─────────────┐
//!        │ FastSolver  │                 │ ExactSolver │
//!        │  O(n·Tmax)  │ ◄── validates ─ │ (Tmax+1)^n  │
//!        └─────────────┘                 └─────────────┘
//!               │                               │
//!               └───────────────┬───────────────┘
//!                               ▼
//!                   Equilibrium → SolveReport
//! ```

#![warn(missing_docs)]

/// Game model: parameters, presence counts, resources and payoffs.
pub mod model;

/// Fast and exact equilibrium solvers.
pub mod solver;

// Re-export commonly used types at crate root for convenience
pub use model::{DeparturePlan, GameParameters, RemainingCount, SolverConfig, TiePolicy};
pub use solver::{
    solve_exact, solve_fast, Equilibrium, EquilibriumSolver, ExactSolver, FastSolver, SolveError,
};
