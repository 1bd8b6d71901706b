//! Replay buffer of self-play training cases.
//!
//! A bounded FIFO: once full, adding a case evicts the oldest one. The
//! trainer draws minibatches without replacement.

use std::collections::VecDeque;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("replay buffer capacity must be greater than zero")]
    ZeroCapacity,

    #[error("requested {requested} cases but only {available} are stored")]
    InsufficientCases { requested: usize, available: usize },
}

/// One training sample: the searched state and the root visit distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCase {
    pub features: Vec<f32>,
    pub distribution: Vec<f32>,
}

impl TrainingCase {
    pub fn new(features: Vec<f32>, distribution: Vec<f32>) -> Self {
        Self {
            features,
            distribution,
        }
    }
}

/// Capacity-bounded FIFO of cases.
#[derive(Debug, Clone)]
pub struct ReplayBuffer<C = TrainingCase> {
    cases: VecDeque<C>,
    capacity: usize,
}

impl<C> ReplayBuffer<C> {
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        Ok(Self {
            cases: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Store a case, evicting the oldest one if the buffer is full.
    pub fn add_case(&mut self, case: C) {
        if self.cases.len() >= self.capacity {
            self.cases.pop_front();
        }
        self.cases.push_back(case);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored cases, oldest first.
    pub fn cases(&self) -> impl Iterator<Item = &C> {
        self.cases.iter()
    }

    /// Draw `k` distinct cases uniformly at random, in no particular order.
    pub fn sample_minibatch(
        &self,
        k: usize,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<&C>, ReplayError> {
        if k > self.cases.len() {
            return Err(ReplayError::InsufficientCases {
                requested: k,
                available: self.cases.len(),
            });
        }

        Ok(rng.choose_multiple(self.cases.iter(), k))
    }
}
