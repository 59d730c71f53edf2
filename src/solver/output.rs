//! Serializable solve reports.

use std::fs::File;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::model::{DeparturePlan, GameParameters, RemainingCount};
use crate::solver::{Equilibrium, SolveError};

/// Outcome of solving one parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceReport {
    /// Parameters that were solved.
    pub params: GameParameters,
    /// Presence counts at equilibrium.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<RemainingCount>,
    /// Equilibrium departure plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<DeparturePlan>,
    /// Payoff of every player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoffs: Option<Vec<f64>>,
    /// Survival probability of every player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survival: Option<Vec<f64>>,
    /// Why the instance could not be solved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceReport {
    /// Record the outcome of solving `params`.
    pub fn new(params: GameParameters, result: Result<Equilibrium, SolveError>) -> Self {
        match result {
            Ok(eq) => {
                let survival = eq.survival(&params);
                Self {
                    params,
                    remaining: Some(eq.remaining),
                    plan: Some(eq.plan),
                    payoffs: Some(eq.payoffs),
                    survival: Some(survival),
                    error: None,
                }
            }
            Err(err) => Self {
                params,
                remaining: None,
                plan: None,
                payoffs: None,
                survival: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Whether an equilibrium was found.
    pub fn is_solved(&self) -> bool {
        self.error.is_none()
    }
}

/// Complete output for a batch of instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// Run information.
    pub metadata: ReportMetadata,
    /// One entry per input parameter set, in input order.
    pub instances: Vec<InstanceReport>,
}

/// Run information for a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Solver name.
    pub solver: String,
    /// Wall-clock time of the batch.
    pub elapsed_secs: f64,
    /// Seconds since the Unix epoch when the report was created.
    pub timestamp: String,
}

impl SolveReport {
    /// Create an empty report.
    pub fn new(solver: &str) -> Self {
        Self {
            metadata: ReportMetadata {
                solver: solver.to_string(),
                elapsed_secs: 0.0,
                timestamp: format!(
                    "{}",
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0)
                ),
            },
            instances: Vec::new(),
        }
    }

    /// Append an instance.
    pub fn add_instance(&mut self, instance: InstanceReport) {
        self.instances.push(instance);
    }

    /// Number of instances with an equilibrium.
    pub fn solved(&self) -> usize {
        self.instances.iter().filter(|i| i.is_solved()).count()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as JSON.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Print one line per instance.
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("  Dispersal equilibria - {} solver", self.metadata.solver);
        println!(
            "  Solved: {}/{} | Time: {:.3}s",
            self.solved(),
            self.instances.len(),
            self.metadata.elapsed_secs
        );
        println!("========================================\n");

        for (i, instance) in self.instances.iter().enumerate() {
            match (&instance.plan, &instance.payoffs, &instance.error) {
                (Some(plan), Some(payoffs), _) => {
                    let payoffs: Vec<String> = payoffs.iter().map(|p| format!("{:.4}", p)).collect();
                    println!("[{}] plan {} payoffs [{}]", i, plan, payoffs.join(", "));
                }
                (_, _, Some(error)) => println!("[{}] {}", i, error),
                _ => println!("[{}] -", i),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SolverConfig;
    use crate::solver::{solve_exact, solve_fast};

    #[test]
    fn test_report_records_solutions_and_errors() {
        let config = SolverConfig::default();
        let good = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);
        let big = good.clone().with_players(9);

        let mut report = SolveReport::new("exact");
        report.add_instance(InstanceReport::new(good.clone(), solve_exact(&good, &config)));
        report.add_instance(InstanceReport::new(big.clone(), solve_exact(&big, &config)));

        assert_eq!(report.solved(), 1);
        assert_eq!(report.instances[1].plan, None);
        assert!(report.instances[1]
            .error
            .as_deref()
            .unwrap()
            .contains("too large"));
    }

    #[test]
    fn test_report_json() {
        let config = SolverConfig::default();
        let params = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);

        let mut report = SolveReport::new("fast");
        report.add_instance(InstanceReport::new(params.clone(), solve_fast(&params, &config)));

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let instance = &value["instances"][0];
        assert_eq!(instance["plan"]["days"], serde_json::json!([3, 3]));
        assert_eq!(instance["remaining"], serde_json::json!([2, 2, 2]));
        assert_eq!(instance["survival"], serde_json::json!([1.0, 1.0]));
        assert!(instance.get("error").is_none());
        assert_eq!(instance["params"]["Tmax"], 3);
    }
}
