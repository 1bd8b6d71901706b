//! The game-state contract every searchable game implements.
//!
//! A [`GameState`] is a value: applying an action never changes the state it
//! is applied to, it returns the successor. Utilities are always expressed in
//! a single global frame where `+1` means the maximizer won and `-1` means the
//! minimizer won, regardless of whose turn it is.

use std::fmt::Debug;

use thiserror::Error;

/// Errors raised by game states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action is not in `legal_actions()` of the state it was applied to.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The operation is not defined in the current state (e.g. utility of a
    /// game that is still running).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The game cannot be set up with the requested parameters.
    #[error("invalid board: {0}")]
    InvalidBoard(String),
}

/// One of the two sides of a zero-sum game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Prefers utility `+1`.
    Maximizer,
    /// Prefers utility `-1`.
    Minimizer,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::Maximizer => Player::Minimizer,
            Player::Minimizer => Player::Maximizer,
        }
    }

    /// Utility of a win for this player in the global frame.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Player::Maximizer => 1.0,
            Player::Minimizer => -1.0,
        }
    }
}

/// The capability set a game must provide to be searched.
pub trait GameState: Clone + Debug {
    /// A move in this game.
    type Action: Copy + Eq + Debug;

    /// True once the game has a winner (or otherwise ended).
    fn is_terminal(&self) -> bool;

    /// All actions legal in this state. Empty when terminal. Never contains
    /// duplicates; the order carries no meaning.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Produce the successor state. `self` is left untouched.
    ///
    /// # Errors
    /// [`GameError::InvalidMove`] if `action` is not legal here.
    fn apply_action(&self, action: Self::Action) -> Result<Self, GameError>;

    /// Result of a finished game: `+1` maximizer win, `-1` minimizer win,
    /// `0` no result.
    ///
    /// # Errors
    /// [`GameError::IllegalState`] if the game is not over.
    fn utility(&self) -> Result<f64, GameError>;

    /// Numeric encoding consumed by an [`Evaluator`](crate::evaluator::Evaluator).
    fn feature_vector(&self) -> Vec<f32>;

    /// The action that produced this state, `None` for the initial state.
    fn previous_action(&self) -> Option<Self::Action>;

    /// The player whose turn it is.
    fn player_to_move(&self) -> Player;

    /// Size of the dense action space used by visit distributions and
    /// evaluator policies.
    fn action_space(&self) -> usize;

    /// Position of `action` in the dense action space. Always
    /// `< self.action_space()`.
    fn action_index(&self, action: Self::Action) -> usize;
}
