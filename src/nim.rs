//! Single-pile Nim.
//!
//! Players alternately remove between 1 and `max_take` pieces; whoever takes
//! the last piece wins. Small enough to solve by hand, which makes it a good
//! check that the search finds the right move: a position is lost for the
//! player to move exactly when `pieces % (max_take + 1) == 0`.

use std::fmt;

use crate::game::{GameError, GameState, Player};

/// A Nim position. Actions are the number of pieces to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NimState {
    pieces: u32,
    max_take: u32,
    to_move: Player,
    winner: Option<Player>,
    last_take: Option<u32>,
}

impl NimState {
    /// A fresh pile with the maximizer to move.
    ///
    /// # Errors
    /// [`GameError::InvalidBoard`] if `max_take` is 0.
    pub fn new(pieces: u32, max_take: u32) -> Result<Self, GameError> {
        if max_take == 0 {
            return Err(GameError::InvalidBoard(
                "max_take must allow removing at least one piece".into(),
            ));
        }
        Ok(Self {
            pieces,
            max_take,
            to_move: Player::Maximizer,
            winner: None,
            last_take: None,
        })
    }

    /// Pieces left in the pile.
    #[inline]
    pub fn pieces(&self) -> u32 {
        self.pieces
    }

    /// Largest legal removal.
    #[inline]
    pub fn max_take(&self) -> u32 {
        self.max_take
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }
}

impl GameState for NimState {
    type Action = u32;

    #[inline]
    fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    fn legal_actions(&self) -> Vec<u32> {
        if self.is_terminal() {
            return Vec::new();
        }
        (1..=self.max_take.min(self.pieces)).collect()
    }

    fn apply_action(&self, take: u32) -> Result<Self, GameError> {
        if self.is_terminal() || take == 0 || take > self.max_take || take > self.pieces {
            return Err(GameError::InvalidMove(format!(
                "cannot take {take} from {} (max {})",
                self.pieces, self.max_take
            )));
        }

        let mut next = self.clone();
        next.pieces -= take;
        next.last_take = Some(take);
        if next.pieces == 0 {
            next.winner = Some(self.to_move);
        }
        next.to_move = self.to_move.opponent();
        Ok(next)
    }

    fn utility(&self) -> Result<f64, GameError> {
        self.winner
            .map(Player::sign)
            .ok_or_else(|| GameError::IllegalState("utility of an unfinished game".into()))
    }

    fn feature_vector(&self) -> Vec<f32> {
        vec![
            self.pieces as f32,
            self.max_take as f32,
            self.to_move.sign() as f32,
        ]
    }

    #[inline]
    fn previous_action(&self) -> Option<u32> {
        self.last_take
    }

    #[inline]
    fn player_to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    fn action_space(&self) -> usize {
        self.max_take as usize
    }

    #[inline]
    fn action_index(&self, take: u32) -> usize {
        take as usize - 1
    }
}

impl fmt::Display for NimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pieces: {}, max take: {}, to move: {:?}",
            self.pieces, self.max_take, self.to_move
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_actions_capped_by_pile() {
        let state = NimState::new(2, 3).unwrap();
        assert_eq!(state.legal_actions(), vec![1, 2]);
    }

    #[test]
    fn test_taking_last_piece_wins() {
        let state = NimState::new(3, 2).unwrap();
        let s1 = state.apply_action(1).unwrap(); // maximizer, 2 left
        assert!(!s1.is_terminal());
        let s2 = s1.apply_action(2).unwrap(); // minimizer takes the rest
        assert!(s2.is_terminal());
        assert_eq!(s2.winner(), Some(Player::Minimizer));
        assert_eq!(s2.utility().unwrap(), -1.0);
        assert!(s2.legal_actions().is_empty());
    }

    #[test]
    fn test_invalid_takes() {
        let state = NimState::new(5, 2).unwrap();
        assert!(matches!(state.apply_action(0), Err(GameError::InvalidMove(_))));
        assert!(matches!(state.apply_action(3), Err(GameError::InvalidMove(_))));
        assert!(NimState::new(5, 0).is_err());
    }

    #[test]
    fn test_action_index_is_dense() {
        let state = NimState::new(5, 3).unwrap();
        assert_eq!(state.action_space(), 3);
        let indices: Vec<usize> = state
            .legal_actions()
            .into_iter()
            .map(|a| state.action_index(a))
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
