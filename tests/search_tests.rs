//! Integration tests for the search driver and self-play.
//!
//! These run real searches on small boards, so budgets are kept low except
//! where a test checks that the search finds a known best move.

use std::cell::Cell;
use std::time::Duration;

use hex_mcts::config::{ConfigError, MctsConfig};
use hex_mcts::evaluator::{Evaluator, EvaluatorError, Prediction, UniformEvaluator};
use hex_mcts::game::GameState;
use hex_mcts::hex::{HexMove, HexState};
use hex_mcts::mcts::{Mcts, SearchError};
use hex_mcts::nim::NimState;
use hex_mcts::selfplay::{SelfPlay, SelfPlayConfig};
use hex_mcts::tree::SearchTree;

// =============================================================================
// Helper functions
// =============================================================================

fn hex(size: usize, moves: &[(usize, usize)]) -> HexState {
    HexState::from_moves(size, moves).unwrap()
}

fn driver(simulations: u32, seed: u64) -> Mcts {
    Mcts::new(
        MctsConfig::default()
            .with_simulations(simulations)
            .with_seed(seed),
    )
    .unwrap()
}

/// Uniform until `budget` calls have been made, then unavailable.
struct FailAfter {
    budget: usize,
    calls: Cell<usize>,
}

impl FailAfter {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            calls: Cell::new(0),
        }
    }
}

impl Evaluator for FailAfter {
    fn predict(&self, features: &[f32], num_actions: usize) -> Result<Prediction, EvaluatorError> {
        let calls = self.calls.get();
        self.calls.set(calls + 1);
        if calls >= self.budget {
            return Err(EvaluatorError::Unavailable("offline".into()));
        }
        UniformEvaluator::new().predict(features, num_actions)
    }
}

// =============================================================================
// Budget and accounting
// =============================================================================

#[test]
fn test_root_visits_equal_simulations() {
    let mut mcts = driver(40, 1);
    let mut tree = SearchTree::new(HexState::new(3).unwrap());
    let outcome = mcts.search_tree(&mut tree).unwrap();

    assert_eq!(outcome.simulations, 40);
    let root = tree.get(tree.root());
    assert_eq!(root.visits(), 40);
    let child_visits: u32 = root.children().iter().map(|&c| tree.get(c).visits()).sum();
    assert_eq!(child_visits, 40);
}

#[test]
fn test_single_legal_action_uses_full_budget() {
    // One empty cell left, no winner yet, minimizer to move.
    let state = hex(2, &[(0, 0), (0, 1), (1, 1)]);
    assert!(!state.is_terminal());
    assert_eq!(state.legal_actions(), vec![HexMove::new(1, 0)]);

    let mut mcts = driver(25, 3);
    let outcome = mcts.search(&state).unwrap();
    assert_eq!(outcome.simulations, 25);
    assert_eq!(outcome.action, HexMove::new(1, 0));
    assert_eq!(outcome.distribution[2], 1.0);
}

#[test]
fn test_terminal_root_is_an_error() {
    let won = hex(3, &[(0, 1), (0, 0), (1, 1), (1, 0), (2, 1)]);
    let mut mcts = driver(10, 0);
    assert!(matches!(mcts.search(&won), Err(SearchError::TerminalRoot)));
}

#[test]
fn test_time_limit_extends_search() {
    let config = MctsConfig::default()
        .with_simulations(0)
        .with_time_limit(Duration::from_millis(30))
        .with_seed(9);
    let mut mcts = Mcts::new(config).unwrap();
    let outcome = mcts.search(&HexState::new(4).unwrap()).unwrap();
    assert!(outcome.simulations > 0);
    assert!(outcome.elapsed >= Duration::from_millis(30));
}

#[test]
fn test_hard_cap_stops_search() {
    let config = MctsConfig::default()
        .with_simulations(u32::MAX)
        .with_hard_cap(Duration::from_millis(50))
        .with_seed(9);
    let mut mcts = Mcts::new(config).unwrap();
    let outcome = mcts.search(&HexState::new(5).unwrap()).unwrap();
    assert!(outcome.simulations < u32::MAX);
    // The cap is only checked between simulations, so the overrun is at
    // most one playout on a 5x5 board.
    assert!(outcome.elapsed >= Duration::from_millis(50));
    assert!(
        outcome.elapsed < Duration::from_millis(250),
        "elapsed {:?}",
        outcome.elapsed
    );
}

#[test]
fn test_zero_length_budget_is_rejected() {
    let config = MctsConfig::default()
        .with_simulations(100)
        .with_hard_cap(Duration::ZERO);
    assert!(matches!(
        Mcts::new(config),
        Err(SearchError::Config(ConfigError::ZeroDuration("hard_cap")))
    ));

    let config = MctsConfig::default()
        .with_simulations(0)
        .with_time_limit(Duration::ZERO);
    assert!(matches!(
        Mcts::new(config),
        Err(SearchError::Config(ConfigError::ZeroDuration("time_limit")))
    ));
}

// =============================================================================
// Visit distribution
// =============================================================================

#[test]
fn test_distribution_is_a_probability_vector() {
    let state = hex(4, &[(0, 0), (1, 2), (3, 3)]);
    let mut mcts = driver(120, 5);
    let outcome = mcts.search(&state).unwrap();

    assert_eq!(outcome.distribution.len(), 16);
    assert!(outcome.distribution.iter().all(|&p| p >= 0.0));
    let total: f32 = outcome.distribution.iter().sum();
    assert!((total - 1.0).abs() < 1e-6, "sum = {total}");

    for occupied in [(0, 0), (1, 2), (3, 3)] {
        let index = state.action_index(occupied.into());
        assert_eq!(outcome.distribution[index], 0.0);
    }
    let best = state.action_index(outcome.action);
    let max = outcome.distribution.iter().cloned().fold(0.0, f32::max);
    assert_eq!(outcome.distribution[best], max);
}

// =============================================================================
// Move quality
// =============================================================================

#[test]
fn test_nim_takes_one_from_seven() {
    // With a maximum take of 2, leaving a multiple of 3 wins.
    let mut mcts = driver(3000, 11);
    let outcome = mcts.search(&NimState::new(7, 2).unwrap()).unwrap();
    assert_eq!(outcome.action, 1);
    assert!(outcome.root_value > 0.0);
}

#[test]
fn test_maximizer_completes_its_column() {
    let state = hex(3, &[(0, 1), (0, 0), (1, 1), (1, 0)]);
    let mut mcts = driver(500, 21);
    let outcome = mcts.search(&state).unwrap();
    assert!(
        [HexMove::new(2, 0), HexMove::new(2, 1)].contains(&outcome.action),
        "played {}",
        outcome.action
    );
    assert!(outcome.best.is_terminal());
}

#[test]
fn test_minimizer_completes_its_row() {
    let state = hex(3, &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2)]);
    let mut mcts = driver(500, 22);
    let outcome = mcts.search(&state).unwrap();
    assert!(
        [HexMove::new(0, 2), HexMove::new(1, 2)].contains(&outcome.action),
        "played {}",
        outcome.action
    );
    assert_eq!(outcome.best.utility().unwrap(), -1.0);
}

// =============================================================================
// Evaluators
// =============================================================================

#[test]
fn test_guided_search_with_uniform_evaluator() {
    let config = MctsConfig::for_testing().with_rollout_epsilon(0.0);
    let mut mcts = Mcts::with_evaluator(config, UniformEvaluator::new()).unwrap();
    assert!(mcts.has_evaluator());

    let state = HexState::new(3).unwrap();
    let outcome = mcts.search(&state).unwrap();
    assert_eq!(outcome.simulations, 50);
    assert!(state.legal_actions().contains(&outcome.action));
}

#[test]
fn test_failing_evaluator_leaves_statistics_unchanged() {
    let config = MctsConfig::for_testing().with_rollout_epsilon(0.0);
    let mut mcts = Mcts::with_evaluator(config, FailAfter::new(0)).unwrap();
    let mut tree = SearchTree::new(HexState::new(3).unwrap());

    let err = mcts.search_tree(&mut tree).unwrap_err();
    assert!(matches!(err, SearchError::Evaluator(EvaluatorError::Unavailable(_))));
    assert_eq!(tree.get(tree.root()).visits(), 0);
    assert_eq!(tree.get(tree.root()).value_sum(), 0.0);
}

#[test]
fn test_failure_mid_search_keeps_completed_simulations() {
    let config = MctsConfig::for_testing().with_rollout_epsilon(0.0);
    let mut mcts = Mcts::with_evaluator(config, FailAfter::new(30)).unwrap();
    let mut tree = SearchTree::new(HexState::new(4).unwrap());

    assert!(mcts.search_tree(&mut tree).is_err());

    // Every completed simulation went through exactly one root child.
    let root = tree.get(tree.root());
    let child_visits: u32 = root.children().iter().map(|&c| tree.get(c).visits()).sum();
    assert!(root.visits() > 0);
    assert_eq!(root.visits(), child_visits);
}

// =============================================================================
// Tree reuse and self-play
// =============================================================================

#[test]
fn test_promoted_tree_keeps_statistics() {
    let mut mcts = driver(200, 13);
    let mut tree = SearchTree::new(HexState::new(3).unwrap());
    let outcome = mcts.search_tree(&mut tree).unwrap();

    let kept = tree.get(outcome.best_node).visits();
    let mut tree = tree.promote(outcome.best_node);
    assert!(tree.get(tree.root()).is_root());
    assert_eq!(tree.get(tree.root()).visits(), kept);

    let again = mcts.search_tree(&mut tree).unwrap();
    assert_eq!(tree.get(tree.root()).visits(), kept + again.simulations);
}

#[test]
fn test_selfplay_run_fills_buffer_and_trains() {
    let config = SelfPlayConfig {
        board_size: 3,
        games: 3,
        replay_capacity: 8,
        minibatch_size: 4,
        reuse_tree: true,
        mcts: MctsConfig::for_testing().with_simulations(40),
    };
    let mut runner = SelfPlay::new(config).unwrap();

    let mut batches = Vec::new();
    let records = runner
        .run(|batch| {
            assert!(batch.iter().all(|case| case.features.len() == 10));
            assert!(batch.iter().all(|case| case.distribution.len() == 9));
            batches.push(batch.len());
        })
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.winner.is_some()));
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|&n| n > 0 && n <= 4));

    let total: usize = records.iter().map(|r| r.cases).sum();
    assert_eq!(runner.buffer().len(), total.min(8));
}
