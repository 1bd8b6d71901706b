//! Self-play episodes that fill a replay buffer.
//!
//! The engine searches once per real move, records the searched state's
//! features with the root visit distribution, plays the most visited move
//! and repeats until the game ends. Training the estimator on the collected
//! cases is left to the caller.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, MctsConfig};
use crate::constants::{
    DEFAULT_BOARD_SIZE, NUMBER_ACTUAL_GAMES, REPLAY_BATCH_SIZE, REPLAY_BUFFER_SIZE,
};
use crate::evaluator::Evaluator;
use crate::game::{GameError, GameState, Player};
use crate::hex::{HexMove, HexState};
use crate::mcts::{Mcts, SearchError};
use crate::replay::{ReplayBuffer, ReplayError, TrainingCase};
use crate::tree::SearchTree;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("replay buffer error: {0}")]
    Replay(#[from] ReplayError),
}

/// Self-play settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfPlayConfig {
    /// Hex board size.
    pub board_size: usize,

    /// Number of games played by [`SelfPlay::run`].
    pub games: usize,

    /// Replay buffer capacity.
    pub replay_capacity: usize,

    /// Upper bound on the minibatch handed to the trainer after each game.
    pub minibatch_size: usize,

    /// Keep the played move's subtree between moves instead of starting
    /// each search from scratch.
    pub reuse_tree: bool,

    pub mcts: MctsConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            games: NUMBER_ACTUAL_GAMES,
            replay_capacity: REPLAY_BUFFER_SIZE,
            minibatch_size: REPLAY_BATCH_SIZE,
            reuse_tree: false,
            mcts: MctsConfig::for_selfplay(),
        }
    }
}

impl SelfPlayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::Zero("board_size"));
        }
        if self.replay_capacity == 0 {
            return Err(ConfigError::Zero("replay_capacity"));
        }
        if self.minibatch_size == 0 {
            return Err(ConfigError::Zero("minibatch_size"));
        }
        self.mcts.validate()
    }
}

/// Summary of one finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord<A> {
    /// Moves in the order they were played.
    pub moves: Vec<A>,

    /// Winner derived from the final utility, `None` for a no-result.
    pub winner: Option<Player>,

    /// Training cases added to the buffer during this game.
    pub cases: usize,
}

/// Self-play runner: a search driver plus the buffer it feeds.
pub struct SelfPlay {
    config: SelfPlayConfig,
    mcts: Mcts,
    buffer: ReplayBuffer<TrainingCase>,
}

impl SelfPlay {
    /// Runner using random playouts.
    pub fn new(config: SelfPlayConfig) -> Result<Self, SelfPlayError> {
        config.validate()?;
        let mcts = Mcts::new(config.mcts.clone())?;
        Self::with_driver(config, mcts)
    }

    /// Runner using playouts guided by `evaluator`.
    pub fn with_evaluator<E: Evaluator + 'static>(
        config: SelfPlayConfig,
        evaluator: E,
    ) -> Result<Self, SelfPlayError> {
        config.validate()?;
        let mcts = Mcts::with_evaluator(config.mcts.clone(), evaluator)?;
        Self::with_driver(config, mcts)
    }

    fn with_driver(config: SelfPlayConfig, mcts: Mcts) -> Result<Self, SelfPlayError> {
        let buffer = ReplayBuffer::new(config.replay_capacity)?;
        Ok(Self {
            config,
            mcts,
            buffer,
        })
    }

    #[inline]
    pub fn buffer(&self) -> &ReplayBuffer<TrainingCase> {
        &self.buffer
    }

    #[inline]
    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    /// Play one game from `initial` to the end.
    pub fn play_game<S: GameState>(
        &mut self,
        initial: S,
    ) -> Result<GameRecord<S::Action>, SelfPlayError> {
        let mut tree = SearchTree::new(initial);
        let mut moves = Vec::new();

        while !tree.get(tree.root()).is_terminal() {
            let outcome = self.mcts.search_tree(&mut tree)?;
            let features = tree.get(tree.root()).state().feature_vector();
            self.buffer.add_case(TrainingCase::new(features, outcome.distribution));

            debug!(
                mover = ?tree.get(tree.root()).state().player_to_move(),
                action = ?outcome.action,
                root_value = outcome.root_value,
                "move played"
            );
            moves.push(outcome.action);

            tree = if self.config.reuse_tree {
                tree.promote(outcome.best_node)
            } else {
                SearchTree::new(outcome.best)
            };
        }

        let utility = tree.get(tree.root()).state().utility()?;
        let winner = if utility > 0.0 {
            Some(Player::Maximizer)
        } else if utility < 0.0 {
            Some(Player::Minimizer)
        } else {
            None
        };
        info!(moves = moves.len(), ?winner, "game finished");

        Ok(GameRecord {
            cases: moves.len(),
            moves,
            winner,
        })
    }

    /// Play `config.games` Hex games. After each one, `train` receives a
    /// minibatch of at most `config.minibatch_size` cases.
    pub fn run<F>(&mut self, mut train: F) -> Result<Vec<GameRecord<HexMove>>, SelfPlayError>
    where
        F: FnMut(&[&TrainingCase]),
    {
        let mut records = Vec::with_capacity(self.config.games);
        for game in 0..self.config.games {
            let record = self.play_game(HexState::new(self.config.board_size)?)?;
            info!(game, winner = ?record.winner, buffer = self.buffer.len(), "self-play game done");
            records.push(record);

            let k = self.config.minibatch_size.min(self.buffer.len());
            let batch = self.buffer.sample_minibatch(k, self.mcts.rng())?;
            train(&batch);
        }
        Ok(records)
    }
}
