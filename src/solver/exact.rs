//! Exhaustive backward-induction solver.
//!
//! The game is expanded into a binary decision tree. Players move in index
//! order within a day; at each node the active player either stays or
//! departs on the current day. A node whose turn passes the last undecided
//! player moves on to the next day, and a node with nobody left to decide,
//! or at the horizon, is a leaf where the undecided players never depart.
//!
//! ```text
//! d0 p0 [-, -]
//! ├── stay   → d0 p1 [-, -]
//! │            ├── stay   → d1 p0 [-, -] ...
//! │            └── depart → d1 p0 [-, 0] ...
//! └── depart → d0 p1 [0, -]
//!              ├── stay   → d1 p1 [0, -] ...
//!              └── depart → leaf  [0, 0]
//! ```
//!
//! Payoffs are evaluated only once the whole tree exists, uniformly on each
//! leaf's complete plan, and then folded back up to the root. The tree has
//! `(Tmax + 1)^n` leaves; use it to validate the fast solver on small games.

use std::fmt;

use crate::model::{evaluate_plan, DeparturePlan, GameParameters, RemainingCount, SolverConfig};
use crate::solver::{Equilibrium, EquilibriumSolver, SolveError};

/// Index of a node in a [`DecisionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A decision point, or a leaf holding a complete plan.
#[derive(Debug, Clone)]
pub struct DecisionNode {
    /// Departure day of each decided player. Complete at leaves.
    pub states: Vec<Option<usize>>,
    /// Payoff of each player: the leaf's own payoffs, or the payoffs
    /// propagated up by backward induction.
    pub efrs: Vec<f64>,
    /// Current day.
    pub day: usize,
    /// Player choosing at this node; `None` at leaves.
    pub player: Option<usize>,
    /// Whether `efrs` holds final values.
    pub solved: bool,
    /// Leaf whose plan this node's subgame resolves to.
    pub outcome: Option<NodeId>,
    children: Option<[NodeId; 2]>,
}

impl DecisionNode {
    /// Whether this node ends the game.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children as `[stay, depart]`.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    fn plan(&self, horizon: usize) -> DeparturePlan {
        let days = self.states.iter().map(|d| d.unwrap_or(horizon)).collect();
        DeparturePlan::new(days, horizon)
    }
}

impl fmt::Display for DecisionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<String> = self
            .states
            .iter()
            .map(|d| d.map_or_else(|| "-".to_string(), |d| d.to_string()))
            .collect();
        match self.player {
            Some(p) => write!(f, "d{} p{} [{}]", self.day, p, states.join(", ")),
            None => write!(f, "leaf [{}]", states.join(", ")),
        }
    }
}

/// The complete decision tree of one game, stored as an arena.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<DecisionNode>,
    players: usize,
    horizon: usize,
}

impl DecisionTree {
    /// Expand the full tree and evaluate every leaf.
    pub fn build(params: &GameParameters) -> Self {
        let mut tree = Self::construct(params);
        tree.evaluate_leaves(params);
        tree
    }

    /// Expand the full tree without evaluating payoffs.
    pub fn construct(params: &GameParameters) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            players: params.players,
            horizon: params.horizon,
        };
        let states = vec![None; params.players];
        let first = tree.first_undecided(&states);
        tree.grow(states, 0, first);
        tree
    }

    /// Depth-first expansion. Returns the id of the new subtree's root.
    fn grow(&mut self, states: Vec<Option<usize>>, day: usize, player: Option<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let active = match player {
            Some(p) if day < self.horizon => p,
            _ => {
                self.nodes.push(DecisionNode {
                    states,
                    efrs: vec![0.0; self.players],
                    day,
                    player: None,
                    solved: false,
                    outcome: None,
                    children: None,
                });
                return id;
            }
        };

        self.nodes.push(DecisionNode {
            states: states.clone(),
            efrs: vec![0.0; self.players],
            day,
            player: Some(active),
            solved: false,
            outcome: None,
            children: None,
        });

        let (stay_day, stay_player) = self.next_turn(&states, day, active);
        let stay = self.grow(states.clone(), stay_day, stay_player);

        let mut departed = states;
        departed[active] = Some(day);
        let (depart_day, depart_player) = self.next_turn(&departed, day, active);
        let depart = self.grow(departed, depart_day, depart_player);

        self.nodes[id.0].children = Some([stay, depart]);
        id
    }

    /// Turn following `active` on `day`: the next undecided player with a
    /// higher index, otherwise the first undecided player on the next day.
    fn next_turn(&self, states: &[Option<usize>], day: usize, active: usize) -> (usize, Option<usize>) {
        match (active + 1..self.players).find(|&p| states[p].is_none()) {
            Some(p) => (day, Some(p)),
            None => (day + 1, self.first_undecided(states)),
        }
    }

    fn first_undecided(&self, states: &[Option<usize>]) -> Option<usize> {
        states.iter().position(Option::is_none)
    }

    /// Evaluate every leaf's complete plan with the payoff model.
    pub fn evaluate_leaves(&mut self, params: &GameParameters) {
        let horizon = self.horizon;
        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            if !node.is_leaf() {
                continue;
            }
            let plan = node.plan(horizon);
            node.efrs = evaluate_plan(&plan, params);
            node.solved = true;
            node.outcome = Some(NodeId(index));
        }
    }

    /// Backward induction from the root.
    ///
    /// Each node keeps its stay branch only when that branch pays its active
    /// player strictly more; otherwise, including payoffs tied under the
    /// configured tolerance, the depart branch wins. Fails with
    /// [`SolveError::UnevaluatedLeaf`] if leaves were never evaluated.
    pub fn solve_ne(&mut self, config: &SolverConfig) -> Result<(DeparturePlan, Vec<f64>), SolveError> {
        let root = self.root();
        self.solve_node(root, config)?;
        let node = &self.nodes[root.0];
        let outcome = node.outcome.ok_or(SolveError::UnevaluatedLeaf { node: root.0 })?;
        Ok((self.nodes[outcome.0].plan(self.horizon), node.efrs.clone()))
    }

    fn solve_node(&mut self, id: NodeId, config: &SolverConfig) -> Result<(), SolveError> {
        let node = &self.nodes[id.0];
        if node.solved {
            return Ok(());
        }
        let (Some([stay, depart]), Some(player)) = (node.children, node.player) else {
            return Err(SolveError::UnevaluatedLeaf { node: id.0 });
        };

        self.solve_node(stay, config)?;
        self.solve_node(depart, config)?;

        let stay_value = self.nodes[stay.0].efrs[player];
        let depart_value = self.nodes[depart.0].efrs[player];
        let winner = if config.tied(stay_value, depart_value) {
            log::trace!("{} indifferent at {}", self.nodes[id.0], stay_value);
            depart
        } else if stay_value > depart_value {
            stay
        } else {
            depart
        };

        let efrs = self.nodes[winner.0].efrs.clone();
        let outcome = self.nodes[winner.0].outcome;
        let node = &mut self.nodes[id.0];
        node.efrs = efrs;
        node.outcome = outcome;
        node.solved = true;
        Ok(())
    }

    /// Root of the tree.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id.0]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every leaf's plan and payoffs.
    pub fn leaves(&self) -> impl Iterator<Item = (DeparturePlan, &[f64])> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| (node.plan(self.horizon), node.efrs.as_slice()))
    }

    /// The leaf with the largest total payoff, the cooperative benchmark
    /// against which the equilibrium can be compared.
    pub fn social_optimum(&self) -> Option<(DeparturePlan, Vec<f64>)> {
        let mut best: Option<(DeparturePlan, &[f64], f64)> = None;
        for (plan, efrs) in self.leaves() {
            let total: f64 = efrs.iter().sum();
            if best.as_ref().map_or(true, |(_, _, t)| total > *t) {
                best = Some((plan, efrs, total));
            }
        }
        best.map(|(plan, efrs, _)| (plan, efrs.to_vec()))
    }
}

/// Ground-truth solver backed by the full decision tree.
#[derive(Debug, Clone, Default)]
pub struct ExactSolver {
    config: SolverConfig,
}

impl ExactSolver {
    /// Create an exact solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Check the instance is valid and small enough to expand.
    pub fn check(&self, params: &GameParameters) -> Result<(), SolveError> {
        params.validate()?;
        self.config.validate()?;

        let cells = params.cells();
        if cells > self.config.max_exact_cells {
            return Err(SolveError::IntractableInstance {
                cells,
                limit: self.config.max_exact_cells,
            });
        }
        Ok(())
    }

    /// Build the evaluated decision tree for inspection.
    pub fn tree(&self, params: &GameParameters) -> Result<DecisionTree, SolveError> {
        self.check(params)?;
        Ok(DecisionTree::build(params))
    }

    /// Solve the game.
    pub fn solve(&self, params: &GameParameters) -> Result<Equilibrium, SolveError> {
        let mut tree = self.tree(params)?;
        log::debug!("expanded decision tree with {} nodes", tree.len());

        let (plan, payoffs) = tree.solve_ne(&self.config)?;
        Ok(Equilibrium {
            remaining: RemainingCount::from_plan(&plan),
            plan,
            payoffs,
        })
    }
}

impl EquilibriumSolver for ExactSolver {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn solve(&self, params: &GameParameters) -> Result<Equilibrium, SolveError> {
        ExactSolver::solve(self, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_payoffs(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "payoffs {:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_tree_shape() {
        // Two players, one day: the root and p1's two nodes decide, 4 leaves
        let params = GameParameters::new(1, 2, 1.0, 1.0, 1.0, 2.0, 1, 1.0, 1.0, 1.0);
        let tree = DecisionTree::construct(&params);

        assert_eq!(tree.leaves().count(), 4);
        assert_eq!(tree.len(), 7);

        let root = tree.node(tree.root());
        assert_eq!(root.player, Some(0));
        assert_eq!(root.day, 0);
        assert_eq!(root.to_string(), "d0 p0 [-, -]");

        let [stay, depart] = root.children().unwrap();
        assert_eq!(tree.node(stay).player, Some(1));
        assert_eq!(tree.node(depart).states, vec![Some(0), None]);
    }

    #[test]
    fn test_leaf_count_matches_plan_space() {
        // Every assignment of days 0..=Tmax to players is reached exactly once
        let params = GameParameters::new(1, 3, 1.0, 1.0, 1.0, 2.0, 2, 1.0, 1.0, 1.0);
        let tree = DecisionTree::construct(&params);

        let mut plans: Vec<Vec<usize>> = tree.leaves().map(|(p, _)| p.days().to_vec()).collect();
        assert_eq!(plans.len(), 27);
        plans.sort();
        plans.dedup();
        assert_eq!(plans.len(), 27);
    }

    #[test]
    fn test_turn_passes_to_next_day() {
        let params = GameParameters::new(1, 2, 1.0, 1.0, 1.0, 2.0, 2, 1.0, 1.0, 1.0);
        let tree = DecisionTree::construct(&params);

        // p0 departs on day 0, p1 stays: p1 decides again on day 1
        let [_, depart] = tree.node(tree.root()).children().unwrap();
        let [stay, _] = tree.node(depart).children().unwrap();
        let node = tree.node(stay);
        assert_eq!((node.day, node.player), (1, Some(1)));
    }

    #[test]
    fn test_leaves_evaluated_after_construction() {
        let params = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);
        let tree = DecisionTree::build(&params);
        for (plan, efrs) in tree.leaves() {
            assert_payoffs(efrs, &evaluate_plan(&plan, &params));
        }
    }

    #[test]
    fn test_three_players_two_days() {
        let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
        let eq = ExactSolver::default().solve(&params).unwrap();

        assert_eq!(eq.plan.days(), &[1, 0, 0]);
        assert_payoffs(&eq.payoffs, &[16.5, 99.0 / 7.0, 99.0 / 7.0]);
    }

    #[test]
    fn test_nobody_departs() {
        let params = GameParameters::new(10, 2, 4.0, 3.0, 4.0, 10.0, 3, 1.0, 2.0, 5.0);
        let eq = ExactSolver::default().solve(&params).unwrap();

        assert_eq!(eq.plan.days(), &[3, 3]);
        assert_payoffs(&eq.payoffs, &[45.0, 45.0]);
    }

    #[test]
    fn test_four_players_split_departure() {
        let params = GameParameters::new(1, 4, 20.0, 10.0, 20.0, 30.0, 2, 2.0, 10.0, 10.0);
        let eq = ExactSolver::default().solve(&params).unwrap();

        assert_eq!(eq.plan.days(), &[1, 1, 0, 0]);
        assert_payoffs(&eq.payoffs, &[6.0, 6.0, 4.0, 4.0]);
    }

    #[test]
    fn test_root_solved_after_induction() {
        let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
        let mut tree = DecisionTree::build(&params);
        let (plan, payoffs) = tree.solve_ne(&SolverConfig::default()).unwrap();

        let root = tree.node(tree.root());
        assert!(root.solved);
        assert_eq!(root.efrs, payoffs);
        assert_payoffs(&payoffs, &evaluate_plan(&plan, &params));
    }

    #[test]
    fn test_induction_requires_evaluated_leaves() {
        let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
        let mut tree = DecisionTree::construct(&params);

        let err = tree.solve_ne(&SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolveError::UnevaluatedLeaf { .. }));
        assert!(!tree.node(tree.root()).solved);

        tree.evaluate_leaves(&params);
        let (plan, _) = tree.solve_ne(&SolverConfig::default()).unwrap();
        assert_eq!(plan.days(), &[1, 0, 0]);
    }

    #[test]
    fn test_social_optimum_dominates_equilibrium_total() {
        let params = GameParameters::new(2, 3, 9.0, 6.0, 6.0, 12.0, 2, 1.0, 1.0, 10.0);
        let mut tree = DecisionTree::build(&params);
        let (_, payoffs) = tree.solve_ne(&SolverConfig::default()).unwrap();
        let (_, best) = tree.social_optimum().unwrap();

        let eq_total: f64 = payoffs.iter().sum();
        let best_total: f64 = best.iter().sum();
        assert!(best_total >= eq_total - 1e-9);
    }

    #[test]
    fn test_rejects_intractable_instance() {
        let params = GameParameters::new(1, 5, 20.0, 10.0, 20.0, 30.0, 4, 2.0, 10.0, 10.0);
        let err = ExactSolver::default().solve(&params).unwrap_err();
        assert!(matches!(
            err,
            SolveError::IntractableInstance { cells: 20, limit: 16 }
        ));

        let solver = ExactSolver::new(SolverConfig::default().with_max_exact_cells(20));
        assert!(solver.check(&params).is_ok());
    }
}
