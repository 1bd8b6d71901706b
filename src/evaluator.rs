//! Evaluator trait for estimator-guided rollouts.
//!
//! An evaluator maps a state's feature vector to a distribution over the
//! dense action space plus a scalar value estimate. In self-play this is a
//! neural network living outside this crate; [`UniformEvaluator`] stands in
//! for it in tests and demos.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),

    #[error("policy has {actual} entries, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("policy entry {index} is not finite")]
    NonFinite { index: usize },

    #[error("value estimate is not finite")]
    NonFiniteValue,
}

/// Output of a single evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Distribution over the dense action space. Entries for illegal actions
    /// may be non-zero; the caller masks them.
    pub policy: Vec<f32>,

    /// Value estimate in the global frame (`+1` favours the maximizer).
    pub value: f32,
}

impl Prediction {
    /// Check the prediction against the expected action-space size.
    pub fn validate(&self, num_actions: usize) -> Result<(), EvaluatorError> {
        if self.policy.len() != num_actions {
            return Err(EvaluatorError::WrongLength {
                expected: num_actions,
                actual: self.policy.len(),
            });
        }
        if let Some(index) = self.policy.iter().position(|p| !p.is_finite()) {
            return Err(EvaluatorError::NonFinite { index });
        }
        if !self.value.is_finite() {
            return Err(EvaluatorError::NonFiniteValue);
        }
        Ok(())
    }
}

/// A policy/value estimator.
pub trait Evaluator {
    /// Evaluate one feature vector.
    ///
    /// # Arguments
    /// * `features` - Output of [`GameState::feature_vector`](crate::game::GameState::feature_vector)
    /// * `num_actions` - Size of the dense action space
    fn predict(&self, features: &[f32], num_actions: usize) -> Result<Prediction, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn predict(&self, features: &[f32], num_actions: usize) -> Result<Prediction, EvaluatorError> {
        (**self).predict(features, num_actions)
    }
}

/// Evaluator returning equal probability for every action and a neutral
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn predict(&self, _features: &[f32], num_actions: usize) -> Result<Prediction, EvaluatorError> {
        if num_actions == 0 {
            return Ok(Prediction {
                policy: Vec::new(),
                value: 0.0,
            });
        }
        Ok(Prediction {
            policy: vec![1.0 / num_actions as f32; num_actions],
            value: 0.0,
        })
    }
}
