//! Tree policy: minimax UCT selection.
//!
//! The utility frame is global, so the two players want opposite things from
//! `Q`. At a node where the maximizer moves we pick the child with the
//! largest `Q + bonus`; where the minimizer moves, the smallest `Q - bonus`.
//! The bonus is `c * sqrt(ln(N_parent + eps) / (N_child + eps))`.

use crate::game::{GameState, Player};
use crate::tree::{Node, NodeId, SearchTree};

/// UCT selection with a configurable exploration constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreePolicy {
    /// Exploration constant `c`.
    pub exploration: f64,
    /// Smoothing term `eps`.
    pub smoothing: f64,
}

impl TreePolicy {
    pub fn new(exploration: f64, smoothing: f64) -> Self {
        Self {
            exploration,
            smoothing,
        }
    }

    /// Exploration bonus for a child visited `child_visits` times under a
    /// parent visited `parent_visits` times.
    #[inline]
    pub fn exploration_bonus(&self, parent_visits: u32, child_visits: u32) -> f64 {
        let eps = self.smoothing;
        self.exploration * ((parent_visits as f64 + eps).ln() / (child_visits as f64 + eps)).sqrt()
    }

    /// Score of `child` from the point of view of `mover`.
    pub fn score<S: GameState>(&self, parent: &Node<S>, child: &Node<S>, mover: Player) -> f64 {
        let bonus = self.exploration_bonus(parent.visits(), child.visits());
        match mover {
            Player::Maximizer => child.mean_value() + bonus,
            Player::Minimizer => child.mean_value() - bonus,
        }
    }

    /// Pick the child of `id` the mover prefers. Equal scores are broken
    /// uniformly at random so unvisited siblings are tried in random order.
    /// `None` if `id` has no children.
    pub fn select_child<S: GameState>(
        &self,
        tree: &SearchTree<S>,
        id: NodeId,
        rng: &mut fastrand::Rng,
    ) -> Option<NodeId> {
        let node = tree.get(id);
        let mover = node.state().player_to_move();
        // Flip minimizer scores so both players maximize.
        let sign = mover.sign();

        let mut best: Vec<NodeId> = Vec::new();
        let mut best_score = f64::NEG_INFINITY;
        for &c in node.children() {
            let score = sign * self.score(node, tree.get(c), mover);
            if score > best_score {
                best_score = score;
                best.clear();
                best.push(c);
            } else if score == best_score {
                best.push(c);
            }
        }

        match best.len() {
            0 => None,
            1 => Some(best[0]),
            n => Some(best[rng.usize(..n)]),
        }
    }

    /// Walk from the root to a node with no children.
    pub fn descend<S: GameState>(&self, tree: &SearchTree<S>, rng: &mut fastrand::Rng) -> NodeId {
        let mut current = tree.root();
        while let Some(next) = self.select_child(tree, current, rng) {
            current = next;
        }
        current
    }
}
