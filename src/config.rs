//! Search configuration.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{EXPLORATION, N_SIMS, ROLLOUT_EPSILON, SELFPLAY_HARD_CAP, SMOOTHING};

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exploration constant must be finite and non-negative, got {0}")]
    Exploration(f64),

    #[error("smoothing term must be finite and positive, got {0}")]
    Smoothing(f64),

    #[error("rollout epsilon must be in [0, 1], got {0}")]
    RolloutEpsilon(f64),

    #[error("search has no budget: zero simulations and no time limit")]
    NoBudget,

    #[error("{0} must be longer than zero")]
    ZeroDuration(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub simulations: u32,

    /// Exploration constant `c` of the UCT bonus.
    pub exploration: f64,

    /// Smoothing term added to visit counts inside the UCT bonus.
    pub smoothing: f64,

    /// Keep searching past `simulations` until this much time has passed.
    pub time_limit: Option<Duration>,

    /// Never start a simulation after this much time has passed, whatever
    /// the other limits say.
    pub hard_cap: Option<Duration>,

    /// Probability of a uniform random move in guided rollouts.
    pub rollout_epsilon: f64,

    /// Seed for the search RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: N_SIMS,
            exploration: EXPLORATION,
            smoothing: SMOOTHING,
            time_limit: None,
            hard_cap: None,
            rollout_epsilon: ROLLOUT_EPSILON,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Fast, reproducible config for tests.
    pub fn for_testing() -> Self {
        Self {
            simulations: 50,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Config used by self-play: the default budget with a hard cap so a
    /// slow evaluator cannot stall a game.
    pub fn for_selfplay() -> Self {
        Self {
            hard_cap: Some(SELFPLAY_HARD_CAP),
            ..Self::default()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.simulations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the soft time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Builder pattern: set the hard cap.
    pub fn with_hard_cap(mut self, cap: Duration) -> Self {
        self.hard_cap = Some(cap);
        self
    }

    /// Builder pattern: set the guided-rollout epsilon.
    pub fn with_rollout_epsilon(mut self, epsilon: f64) -> Self {
        self.rollout_epsilon = epsilon;
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the values describe a usable search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::Exploration(self.exploration));
        }
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if !(0.0..=1.0).contains(&self.rollout_epsilon) {
            return Err(ConfigError::RolloutEpsilon(self.rollout_epsilon));
        }
        if self.time_limit == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroDuration("time_limit"));
        }
        if self.hard_cap == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroDuration("hard_cap"));
        }
        if self.simulations == 0 && self.time_limit.is_none() {
            return Err(ConfigError::NoBudget);
        }
        Ok(())
    }

    /// Whether another simulation may start.
    ///
    /// `(elapsed < time_limit OR done < simulations) AND elapsed < hard_cap`
    pub fn should_continue(&self, done: u32, elapsed: Duration) -> bool {
        let within_time = self.time_limit.is_some_and(|limit| elapsed < limit);
        let within_cap = self.hard_cap.is_none_or(|cap| elapsed < cap);
        (within_time || done < self.simulations) && within_cap
    }
}
