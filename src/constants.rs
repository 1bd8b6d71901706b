//! Default parameters for the search engine, the games and self-play.
//!
//! Everything here is a default only. The values actually used by a search
//! are carried in [`MctsConfig`](crate::config::MctsConfig) and
//! [`SelfPlayConfig`](crate::selfplay::SelfPlayConfig), which are passed
//! explicitly to the constructors that need them.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Default Hex board size (NxN).
pub const DEFAULT_BOARD_SIZE: usize = 5;

/// Largest supported Hex board. Cell indices and the two virtual border
/// nodes must fit in a `u32`, and boards beyond this are unplayable anyway.
pub const MAX_BOARD_SIZE: usize = 26;

/// Offsets `(d_row, d_col)` to the six neighbours of a hex cell.
/// The board is a rhombus, so (-1,+1) and (+1,-1) are adjacent but
/// (-1,-1) and (+1,+1) are not.
pub const HEX_DELTA: [(isize, isize); 6] = [
    (-1, 0),  // up
    (-1, 1),  // up-right
    (0, 1),   // right
    (1, 0),   // down
    (1, -1),  // down-left
    (0, -1),  // left
];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: u32 = 500;

/// Default UCT exploration constant.
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Smoothing term added to visit counts in the exploration bonus so that
/// unvisited children never divide by zero.
pub const SMOOTHING: f64 = 1.0;

/// Probability of a uniform random move during a guided rollout.
pub const ROLLOUT_EPSILON: f64 = 0.1;

/// Hard cap on one self-play search, whatever the other limits say.
pub const SELFPLAY_HARD_CAP: Duration = Duration::from_secs(10);

/// Progress report period (number of simulations between trace reports).
pub const REPORT_PERIOD: u32 = 100;

// =============================================================================
// Self-play / Replay Buffer
// =============================================================================

/// Default replay buffer capacity.
pub const REPLAY_BUFFER_SIZE: usize = 250;

/// Default minibatch size drawn from the replay buffer after each game.
pub const REPLAY_BATCH_SIZE: usize = 32;

/// Default number of self-play games.
pub const NUMBER_ACTUAL_GAMES: usize = 10;

// =============================================================================
// Nim
// =============================================================================

/// Default number of pieces in the Nim pile.
pub const NIM_PIECES: u32 = 7;

/// Default maximum number of pieces removed per Nim move.
pub const NIM_MAX_TAKE: u32 = 2;
