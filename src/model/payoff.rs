//! Survival and fitness payoffs.
//!
//! A player departing with resources `R` must spend
//! `q = ceil(max(0, (Rmax - R) / c))` days in transit and survives each of
//! them with probability `R / (R + k)`. Surviving dispersers earn `f + b`
//! per remaining day plus `(N - 1)(f + b)` from the broods they represent.
//! A player that never departs earns `f` per day after its holdings reach
//! `Rmax` (day `z`) plus `(N - 1) f`.

use crate::model::config::GameParameters;
use crate::model::plan::{DeparturePlan, RemainingCount};
use crate::model::resources::{accrue, ResourceTrajectory};

/// Days spent in transit when departing with `resources`.
///
/// Kept as a whole number in `f64`: a small `c` against a large `Rmax` gives
/// transit times far beyond any integer exponent.
pub fn transit_time(resources: f64, params: &GameParameters) -> f64 {
    ((params.r_max - resources) / params.c).max(0.0).ceil()
}

/// Probability of surviving `q` days of transit with `resources`.
fn survival_over(q: f64, resources: f64, params: &GameParameters) -> f64 {
    if q == 0.0 {
        return 1.0;
    }
    (resources / (resources + params.k)).powf(q)
}

/// Probability of surviving transit when departing with `resources`.
pub fn survival_probability(resources: f64, params: &GameParameters) -> f64 {
    survival_over(transit_time(resources, params), resources, params)
}

/// Fitness of departing on `day` holding `resources`.
pub fn payoff_if_departs(day: usize, resources: f64, params: &GameParameters) -> f64 {
    let q = transit_time(resources, params);
    let survival = survival_over(q, resources, params);
    if survival == 0.0 {
        return 0.0;
    }

    let horizon = params.horizon as f64;
    let per_day = params.f + params.b;
    let remaining_share = (horizon - day as f64 - q) / horizon;

    survival * (remaining_share * per_day + (params.broods as f64 - 1.0) * per_day)
}

/// Fitness of never departing, where `z_index` is the first day the
/// holdings reach `Rmax` (the horizon if never).
pub fn payoff_if_stays(z_index: usize, params: &GameParameters) -> f64 {
    let horizon = params.horizon as f64;
    ((horizon - z_index as f64) / horizon) * params.f + (params.broods as f64 - 1.0) * params.f
}

/// Payoff of every option open to a player facing `trajectory`: departing
/// on each day `0..Tmax`, followed by never departing at index `Tmax`.
pub fn candidate_payoffs(trajectory: &ResourceTrajectory, params: &GameParameters) -> Vec<f64> {
    let mut payoffs: Vec<f64> = trajectory
        .values()
        .iter()
        .enumerate()
        .map(|(day, &resources)| payoff_if_departs(day, resources, params))
        .collect();
    payoffs.push(payoff_if_stays(trajectory.rmax_index(params.r_max), params));
    payoffs
}

/// Payoff of every player under a complete plan.
pub fn payoff_vector(
    plan: &DeparturePlan,
    remaining: &RemainingCount,
    params: &GameParameters,
) -> Vec<f64> {
    let trajectory = accrue(remaining, params);
    let stay_payoff = payoff_if_stays(trajectory.rmax_index(params.r_max), params);

    plan.days()
        .iter()
        .map(|&day| {
            if day >= params.horizon {
                stay_payoff
            } else {
                payoff_if_departs(day, trajectory.at(day), params)
            }
        })
        .collect()
}

/// Payoff of every player, deriving the presence counts from the plan.
pub fn evaluate_plan(plan: &DeparturePlan, params: &GameParameters) -> Vec<f64> {
    payoff_vector(plan, &RemainingCount::from_plan(plan), params)
}

/// Survival probability of every player. Players that never depart survive
/// with certainty.
pub fn compute_survival_vector(
    params: &GameParameters,
    plan: &DeparturePlan,
    trajectory: &ResourceTrajectory,
) -> Vec<f64> {
    plan.days()
        .iter()
        .map(|&day| {
            if day >= params.horizon {
                1.0
            } else {
                survival_probability(trajectory.at(day), params)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GameParameters {
        GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0)
    }

    #[test]
    fn test_transit_time() {
        let params = params();
        assert_eq!(transit_time(6.0, &params), 1.0);
        assert_eq!(transit_time(5.0, &params), 2.0);
        assert_eq!(transit_time(12.0, &params), 0.0);
        assert_eq!(transit_time(20.0, &params), 0.0);
    }

    #[test]
    fn test_survival_probability() {
        let params = params();
        assert!((survival_probability(6.0, &params) - 6.0 / 7.0).abs() < 1e-12);
        assert_eq!(survival_probability(12.0, &params), 1.0);
        assert_eq!(survival_probability(0.0, &params), 0.0);
    }

    #[test]
    fn test_survival_in_unit_interval() {
        let cases = [
            params(),
            // Transit times in the millions and beyond any i32 exponent
            GameParameters::new(1, 1, 1.0, 1e-4, 1.0, 1e6, 1, 1.0, 1.0, 1.0),
            GameParameters::new(1, 1, 1.0, 1e-9, 1.0, 1e9, 1, 1.0, 1.0, 1.0),
            GameParameters::new(3, 4, 2.0, 0.5, 2.0, 500.0, 10, 1.0, 0.01, 3.0),
            GameParameters::new(3, 4, 2.0, 7.0, 2.0, 50.0, 10, 1.0, 1e4, 3.0),
        ];
        for params in &cases {
            assert!(params.validate().is_ok());
            for i in 0..200 {
                let resources = i as f64 * 0.37 + (i * i) as f64;
                let p = survival_probability(resources, params);
                assert!((0.0..=1.0).contains(&p), "p({}) = {} for {:?}", resources, p, params);
            }
        }
    }

    #[test]
    fn test_long_transit_payoff() {
        let params = GameParameters::new(1, 1, 1.0, 1e-4, 1.0, 1e6, 1, 1.0, 1.0, 1.0);
        let q = transit_time(1.0, &params);
        assert!(q > i32::MAX as f64);
        assert_eq!(survival_probability(1.0, &params), 0.0);
        assert_eq!(payoff_if_departs(0, 1.0, &params), 0.0);

        // A long but finite transit still scales the payoff by its survival
        let params = GameParameters::new(1, 1, 1.0, 1.0, 1.0, 41.0, 1, 1.0, 1.0, 1.0);
        let q = transit_time(1.0, &params);
        assert_eq!(q, 40.0);
        let expected = 0.5f64.powi(40) * ((1.0 - 40.0) * 2.0);
        assert!((payoff_if_departs(0, 1.0, &params) - expected).abs() < 1e-20);
    }

    #[test]
    fn test_payoff_if_departs() {
        let params = params();
        // Day 0 with 6 resources: q = 1, p = 6/7, (2 - 0 - 1)/2 * 11 + 11
        let expected = 6.0 / 7.0 * (0.5 * 11.0 + 11.0);
        assert!((payoff_if_departs(0, 6.0, &params) - expected).abs() < 1e-12);
        assert!((expected - 99.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_payoff_if_stays() {
        let params = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);
        assert_eq!(payoff_if_stays(3, &params), 45.0);
        assert_eq!(payoff_if_stays(0, &params), 50.0);
    }

    #[test]
    fn test_candidate_payoffs_layout() {
        let params = params();
        let trajectory = accrue(&RemainingCount::full(3, 2), &params);
        let candidates = candidate_payoffs(&trajectory, &params);
        assert_eq!(candidates.len(), 3);
        assert!((candidates[0] - 99.0 / 7.0).abs() < 1e-12);
        // Holdings peak at 9 < Rmax, so z = Tmax and staying yields (N-1)f
        assert_eq!(candidates[2], 10.0);
    }

    #[test]
    fn test_survival_vector() {
        let params = params();
        let plan = DeparturePlan::new(vec![1, 0, 2], 2);
        let trajectory = accrue(&RemainingCount::from_plan(&plan), &params);
        let survival = compute_survival_vector(&params, &plan, &trajectory);
        assert_eq!(survival.len(), 3);
        assert_eq!(survival[2], 1.0);
        assert!((survival[1] - 6.0 / 7.0).abs() < 1e-12);
        // Two players present on day 0, so day 1 holdings are 6 + 9/2, q = 1
        assert!((survival[0] - 10.5 / 11.5).abs() < 1e-12);
    }
}
