//! Leaf evaluation by playing the game out to the end.
//!
//! A playout starts at a frontier node and keeps choosing a successor until
//! the game is over, returning the terminal node and its utility. Every
//! node visited on the way is fully expanded first and the playout then
//! steps into one of its children, so the tail of a playout is an ordinary
//! part of the search tree that later simulations can select into.
//!
//! Because every node on the path is expanded, a search builds large trees:
//! roughly 125k, 540k and 1.5M nodes for 500 simulations on 5x5, 7x7 and
//! 9x9 Hex boards.
//!
//! Two move choosers are provided:
//! - [`random_playout`]: uniformly random legal moves
//! - [`guided_playout`]: epsilon-greedy on an [`Evaluator`]'s policy, masked
//!   to the legal moves

use tracing::trace;

use crate::evaluator::Evaluator;
use crate::game::GameState;
use crate::mcts::SearchError;
use crate::tree::{NodeId, SearchTree};

/// Result of a playout: the terminal node reached and its utility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playout {
    pub leaf: NodeId,
    pub value: f64,
}

/// Play uniformly random moves from `from` until the game ends.
pub fn random_playout<S: GameState>(
    tree: &mut SearchTree<S>,
    from: NodeId,
    rng: &mut fastrand::Rng,
) -> Result<Playout, SearchError> {
    playout_with(tree, from, |tree, node| {
        let children = tree.get(node).children();
        Ok(children[rng.usize(..children.len())])
    })
}

/// Play moves chosen by `evaluator` from `from` until the game ends.
///
/// With probability `epsilon` a uniformly random legal move is played
/// instead of the evaluator's favourite. The evaluator is not consulted for
/// those moves.
pub fn guided_playout<S, E>(
    tree: &mut SearchTree<S>,
    from: NodeId,
    evaluator: &E,
    epsilon: f64,
    rng: &mut fastrand::Rng,
) -> Result<Playout, SearchError>
where
    S: GameState,
    E: Evaluator + ?Sized,
{
    playout_with(tree, from, |tree, node| {
        let children = tree.get(node).children();
        if rng.f64() < epsilon {
            return Ok(children[rng.usize(..children.len())]);
        }

        let state = tree.get(node).state();
        let num_actions = state.action_space();
        let prediction = evaluator.predict(&state.feature_vector(), num_actions)?;
        prediction.validate(num_actions)?;

        // Mask: only children (legal moves) are candidates.
        let mut best = children[0];
        let mut best_p = f32::NEG_INFINITY;
        for &c in children {
            let Some(action) = tree.get(c).state().previous_action() else {
                continue;
            };
            let p = prediction.policy[state.action_index(action)];
            if p > best_p {
                best_p = p;
                best = c;
            }
        }
        Ok(best)
    })
}

/// Shared loop: expand, let `choose` pick a child, step, until terminal.
fn playout_with<S, F>(
    tree: &mut SearchTree<S>,
    from: NodeId,
    mut choose: F,
) -> Result<Playout, SearchError>
where
    S: GameState,
    F: FnMut(&SearchTree<S>, NodeId) -> Result<NodeId, SearchError>,
{
    let mut node = from;
    let mut depth = 0usize;

    while !tree.get(node).is_terminal() {
        tree.expand_legal(node)?;
        if tree.get(node).is_leaf() {
            // Not terminal yet nothing to play: the game is stuck.
            return Err(SearchError::NoChildren);
        }
        node = choose(tree, node)?;
        depth += 1;
    }

    let value = tree.get(node).state().utility()?;
    trace!(depth, value, "playout finished");
    Ok(Playout { leaf: node, value })
}
