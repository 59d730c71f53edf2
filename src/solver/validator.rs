//! Equilibrium checks.
//!
//! The solvers assume every best response is unique. A tie among maximal
//! payoffs means the player is indifferent, which points at a mixed-strategy
//! equilibrium the pure-strategy model cannot represent.

use crate::model::{DeparturePlan, SolverConfig};
use crate::solver::SolveError;

/// Fail with `AmbiguousEquilibrium` when two or more payoffs are tied for the
/// maximum under the configured tolerance.
pub fn uniqueness_check(payoffs: &[f64], config: &SolverConfig) -> Result<(), SolveError> {
    let best = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let maxima: Vec<usize> = payoffs
        .iter()
        .enumerate()
        .filter(|&(_, &p)| config.tied(p, best))
        .map(|(i, _)| i)
        .collect();

    if maxima.len() > 1 {
        return Err(SolveError::AmbiguousEquilibrium {
            step: None,
            candidates: maxima,
            payoff: best,
        });
    }
    Ok(())
}

/// Index of the first maximal payoff.
pub fn first_argmax(payoffs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &p) in payoffs.iter().enumerate() {
        if p > payoffs[best] {
            best = i;
        }
    }
    best
}

/// Whether two plans assign the same multiset of departure days.
///
/// Players are interchangeable at equilibrium, so solvers that resolve them
/// in different orders agree when their day histograms match.
pub fn plans_agree(a: &DeparturePlan, b: &DeparturePlan) -> bool {
    a.len() == b.len() && a.horizon() == b.horizon() && a.day_histogram() == b.day_histogram()
}

/// Whether two payoff vectors agree as multisets under the tolerance.
pub fn payoffs_agree(a: &[f64], b: &[f64], config: &SolverConfig) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);
    a.iter().zip(&b).all(|(&x, &y)| config.tied(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_maximum_passes() {
        let config = SolverConfig::default();
        assert!(uniqueness_check(&[1.0, 3.0, 2.0], &config).is_ok());
        assert!(uniqueness_check(&[3.0, 3.0 - 1e-6], &config).is_ok());
    }

    #[test]
    fn test_tied_maximum_fails() {
        let config = SolverConfig::default();
        let err = uniqueness_check(&[2.0, 5.0, 1.0, 5.0 + 1e-12], &config).unwrap_err();
        match err {
            SolveError::AmbiguousEquilibrium { candidates, payoff, .. } => {
                assert_eq!(candidates, vec![1, 3]);
                assert!((payoff - 5.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_tie_below_maximum_is_fine() {
        let config = SolverConfig::default();
        assert!(uniqueness_check(&[1.0, 1.0, 4.0], &config).is_ok());
    }

    #[test]
    fn test_first_argmax() {
        assert_eq!(first_argmax(&[1.0, 4.0, 2.0, 4.0]), 1);
        assert_eq!(first_argmax(&[7.0]), 0);
    }

    #[test]
    fn test_plans_agree_as_multisets() {
        let a = DeparturePlan::new(vec![1, 0, 0], 2);
        let b = DeparturePlan::new(vec![0, 1, 0], 2);
        let c = DeparturePlan::new(vec![1, 1, 0], 2);
        assert!(plans_agree(&a, &b));
        assert!(!plans_agree(&a, &c));
    }

    #[test]
    fn test_payoffs_agree_as_multisets() {
        let config = SolverConfig::default();
        assert!(payoffs_agree(&[16.5, 99.0 / 7.0], &[99.0 / 7.0, 16.5], &config));
        assert!(!payoffs_agree(&[1.0, 2.0], &[1.0, 2.1], &config));
        assert!(!payoffs_agree(&[1.0], &[1.0, 1.0], &config));
    }
}
