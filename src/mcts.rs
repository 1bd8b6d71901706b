//! Monte Carlo Tree Search driver.
//!
//! Each simulation runs four phases over a [`SearchTree`]:
//!
//! 1. **Select**: descend from the root with the minimax UCT [`TreePolicy`]
//!    until a node without children
//! 2. **Expand**: give that node one child per legal action
//! 3. **Evaluate**: play the game out from there, randomly or guided by an
//!    [`Evaluator`], and take the terminal utility
//! 4. **Backpropagate**: add the utility to every node from the terminal
//!    node back to the root
//!
//! Utilities stay in the global frame (`+1` = maximizer win) on every node;
//! the tree policy is what makes each side prefer its own outcome.
//!
//! A simulation either completes and updates every node on its path, or
//! fails before backpropagation and updates none, so an error never leaves
//! partial statistics behind.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::{ConfigError, MctsConfig};
use crate::constants::REPORT_PERIOD;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::game::{GameError, GameState};
use crate::playout::{guided_playout, random_playout};
use crate::policy::TreePolicy;
use crate::tree::{NodeId, SearchTree};

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("cannot search from a terminal state")]
    TerminalRoot,

    #[error("non-terminal state has no legal actions")]
    NoChildren,

    #[error("search budget ran out before any simulation completed")]
    NoSimulations,

    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome<S: GameState> {
    /// Action leading to the most visited root child.
    pub action: S::Action,

    /// State after playing `action`.
    pub best: S,

    /// Tree node holding `best`, for [`SearchTree::promote`].
    pub best_node: NodeId,

    /// Root visit distribution over the dense action space.
    pub distribution: Vec<f32>,

    /// Simulations run by this call.
    pub simulations: u32,

    /// Wall-clock time spent.
    pub elapsed: Duration,

    /// Mean utility at the root after the search.
    pub root_value: f64,

    /// Number of nodes in the tree after the search.
    pub tree_size: usize,
}

/// Search driver. Owns the configuration, the RNG and an optional evaluator.
///
/// Without an evaluator leaves are evaluated by uniformly random playouts;
/// with one, by epsilon-greedy guided playouts.
pub struct Mcts {
    config: MctsConfig,
    policy: TreePolicy,
    evaluator: Option<Box<dyn Evaluator>>,
    rng: fastrand::Rng,
}

impl Mcts {
    /// Driver using random playouts.
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Ok(Self {
            policy: TreePolicy::new(config.exploration, config.smoothing),
            config,
            evaluator: None,
            rng,
        })
    }

    /// Driver using playouts guided by `evaluator`.
    pub fn with_evaluator<E: Evaluator + 'static>(
        config: MctsConfig,
        evaluator: E,
    ) -> Result<Self, SearchError> {
        let mut mcts = Self::new(config)?;
        mcts.evaluator = Some(Box::new(evaluator));
        Ok(mcts)
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    #[inline]
    pub fn has_evaluator(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Mutable access to the driver's RNG, e.g. for sampling from the
    /// replay buffer with the same seed.
    #[inline]
    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    /// Search from a fresh tree rooted at `state`.
    pub fn search<S: GameState>(&mut self, state: &S) -> Result<SearchOutcome<S>, SearchError> {
        let mut tree = SearchTree::new(state.clone());
        self.search_tree(&mut tree)
    }

    /// Search an existing tree, adding to its statistics. Use this with
    /// [`SearchTree::promote`] to reuse work across real moves.
    ///
    /// # Errors
    /// - [`SearchError::TerminalRoot`] if the root is terminal; no
    ///   simulation is run
    /// - [`SearchError::NoChildren`] if the root has no legal actions
    /// - [`SearchError::NoSimulations`] if the time budget ran out before
    ///   the first simulation
    /// - any error from a simulation; statistics of earlier simulations
    ///   are kept
    pub fn search_tree<S: GameState>(
        &mut self,
        tree: &mut SearchTree<S>,
    ) -> Result<SearchOutcome<S>, SearchError> {
        let root = tree.root();
        if tree.get(root).is_terminal() {
            return Err(SearchError::TerminalRoot);
        }
        tree.expand_legal(root)?;
        if tree.get(root).is_leaf() {
            return Err(SearchError::NoChildren);
        }

        let start = Instant::now();
        let mut done = 0u32;
        while self.config.should_continue(done, start.elapsed()) {
            self.simulate(tree)?;
            done += 1;

            if done % REPORT_PERIOD == 0 {
                trace!(
                    simulations = done,
                    root_value = tree.get(root).mean_value(),
                    nodes = tree.len(),
                    "search progress"
                );
            }
        }
        let elapsed = start.elapsed();
        if done == 0 {
            return Err(SearchError::NoSimulations);
        }

        let best_node = tree
            .best_child(root, &mut self.rng)
            .ok_or(SearchError::NoChildren)?;
        let best = tree.get(best_node).state().clone();
        let action = best.previous_action().ok_or_else(|| {
            GameError::IllegalState("child state without a previous action".into())
        })?;

        let outcome = SearchOutcome {
            action,
            best,
            best_node,
            distribution: tree.visit_distribution(root),
            simulations: done,
            elapsed,
            root_value: tree.get(root).mean_value(),
            tree_size: tree.len(),
        };

        debug!(
            action = ?outcome.action,
            simulations = outcome.simulations,
            root_value = outcome.root_value,
            nodes = outcome.tree_size,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(outcome)
    }

    /// Run one select, expand, evaluate, backpropagate cycle.
    pub fn simulate<S: GameState>(&mut self, tree: &mut SearchTree<S>) -> Result<(), SearchError> {
        let frontier = self.policy.descend(tree, &mut self.rng);

        let (leaf, value) = if tree.get(frontier).is_terminal() {
            (frontier, tree.get(frontier).state().utility()?)
        } else {
            tree.expand_legal(frontier)?;
            let playout = match &self.evaluator {
                Some(evaluator) => guided_playout(
                    tree,
                    frontier,
                    evaluator.as_ref(),
                    self.config.rollout_epsilon,
                    &mut self.rng,
                )
                .inspect_err(|e| warn!(error = %e, "guided playout failed"))?,
                None => random_playout(tree, frontier, &mut self.rng)?,
            };
            (playout.leaf, playout.value)
        };

        tree.backpropagate(leaf, value);
        Ok(())
    }
}
