//! hex-mcts: Monte Carlo Tree Search for two-player zero-sum games.
//!
//! The engine searches any game implementing [`game::GameState`] and reports
//! the most visited move together with the root visit distribution, which
//! self-play feeds to a replay buffer as a policy training target.
//!
//! ## Modules
//!
//! - [`constants`] - Default engine parameters
//! - [`game`] - The game-state contract and players
//! - [`disjoint_set`] - Union-find used for Hex connectivity
//! - [`hex`] - Hex with incremental win detection
//! - [`nim`] - Single-pile Nim, a small solved game for sanity checks
//! - [`tree`] - Arena-backed search tree
//! - [`policy`] - Minimax UCT selection
//! - [`evaluator`] - Policy/value estimator interface
//! - [`playout`] - Random and evaluator-guided playouts
//! - [`config`] - Search configuration
//! - [`mcts`] - The search driver
//! - [`replay`] - Replay buffer of training cases
//! - [`selfplay`] - Self-play episodes
//!
//! ## Example
//!
//! ```
//! use hex_mcts::config::MctsConfig;
//! use hex_mcts::game::GameState;
//! use hex_mcts::hex::HexState;
//! use hex_mcts::mcts::Mcts;
//!
//! let state = HexState::new(3).unwrap();
//! let mut mcts = Mcts::new(MctsConfig::for_testing()).unwrap();
//!
//! let outcome = mcts.search(&state).unwrap();
//! println!("Best move: {}", outcome.action);
//!
//! let next = state.apply_action(outcome.action).unwrap();
//! assert_eq!(next.stones(), 1);
//! ```

pub mod config;
pub mod constants;
pub mod disjoint_set;
pub mod evaluator;
pub mod game;
pub mod hex;
pub mod mcts;
pub mod nim;
pub mod playout;
pub mod policy;
pub mod replay;
pub mod selfplay;
pub mod tree;
