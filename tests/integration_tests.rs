//! Integration tests for the game implementations.
//!
//! Hex win detection is checked both on hand-built positions and against a
//! flood-fill reference over random games.

use std::collections::VecDeque;

use hex_mcts::game::{GameError, GameState, Player};
use hex_mcts::hex::{HexMove, HexState};
use hex_mcts::nim::NimState;

// =============================================================================
// Helper functions
// =============================================================================

/// Apply moves one at a time, alternating from the maximizer.
fn play(size: usize, moves: &[(usize, usize)]) -> HexState {
    HexState::from_moves(size, moves).unwrap()
}

/// Reference winner: flood fill from each player's first border.
fn flood_fill_winner(state: &HexState) -> Option<Player> {
    let size = state.size();
    for player in [Player::Maximizer, Player::Minimizer] {
        let starts: Vec<HexMove> = (0..size)
            .map(|i| match player {
                Player::Maximizer => HexMove::new(0, i),
                Player::Minimizer => HexMove::new(i, 0),
            })
            .filter(|&mv| state.cell(mv) == Some(player))
            .collect();

        let mut seen = vec![false; size * size];
        let mut queue: VecDeque<HexMove> = starts.into_iter().collect();
        while let Some(mv) = queue.pop_front() {
            if seen[mv.index(size)] {
                continue;
            }
            seen[mv.index(size)] = true;
            let reached = match player {
                Player::Maximizer => mv.row == size - 1,
                Player::Minimizer => mv.col == size - 1,
            };
            if reached {
                return Some(player);
            }
            for n in state.neighbors(mv) {
                if state.cell(n) == Some(player) && !seen[n.index(size)] {
                    queue.push_back(n);
                }
            }
        }
    }
    None
}

// =============================================================================
// Hex win detection
// =============================================================================

#[test]
fn test_middle_column_wins_on_third_stone() {
    let mut state = HexState::new(3).unwrap();
    let moves = [
        (0, 1), // maximizer
        (0, 0), // minimizer
        (1, 1), // maximizer
        (1, 0), // minimizer
    ];
    for &mv in &moves {
        state = state.apply_action(mv.into()).unwrap();
        assert!(!state.is_terminal(), "no winner before the path is complete");
        assert!(state.utility().is_err());
    }

    state = state.apply_action(HexMove::new(2, 1)).unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Player::Maximizer));
    assert_eq!(state.utility().unwrap(), 1.0);
    assert!(state.legal_actions().is_empty());
}

#[test]
fn test_minimizer_row_wins() {
    let state = play(3, &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2)]);
    assert!(!state.is_terminal());

    let state = state.apply_action(HexMove::new(1, 2)).unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Player::Minimizer));
    assert_eq!(state.utility().unwrap(), -1.0);
}

#[test]
fn test_path_along_short_diagonal_wins() {
    // (0,2) - (1,1) - (2,0) are pairwise adjacent on a hex rhombus.
    let state = play(3, &[(0, 2), (0, 0), (1, 1), (1, 0), (2, 0)]);
    assert_eq!(state.winner(), Some(Player::Maximizer));
}

#[test]
fn test_long_diagonal_is_not_connected() {
    // (0,0) - (1,1) - (2,2) do not touch each other.
    let state = play(3, &[(0, 0), (2, 0), (1, 1), (0, 2), (2, 2)]);
    assert!(!state.is_terminal());
    assert_eq!(flood_fill_winner(&state), None);
}

#[test]
fn test_minimizer_first_board() {
    let state = HexState::with_first_player(3, Player::Minimizer).unwrap();
    assert_eq!(state.player_to_move(), Player::Minimizer);
    let next = state.apply_action(HexMove::new(1, 1)).unwrap();
    assert_eq!(next.cell(HexMove::new(1, 1)), Some(Player::Minimizer));
    assert_eq!(next.player_to_move(), Player::Maximizer);
}

#[test]
fn test_incremental_winner_matches_flood_fill() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for size in [2, 3, 5, 7] {
        for _ in 0..40 {
            let mut state = HexState::new(size).unwrap();
            while !state.is_terminal() {
                let actions = state.legal_actions();
                let mv = actions[rng.usize(..actions.len())];
                state = state.apply_action(mv).unwrap();
                assert_eq!(
                    state.winner(),
                    flood_fill_winner(&state),
                    "size {size}, after {mv}:\n{state}"
                );
            }
            // Hex never ends in a draw.
            assert!(state.winner().is_some());
        }
    }
}

// =============================================================================
// Hex contract
// =============================================================================

#[test]
fn test_initial_state() {
    let state = HexState::new(4).unwrap();
    assert_eq!(state.legal_actions().len(), 16);
    assert_eq!(state.action_space(), 16);
    assert_eq!(state.previous_action(), None);
    assert_eq!(state.player_to_move(), Player::Maximizer);
    assert!(!state.is_terminal());
    assert_eq!(state.stones(), 0);
}

#[test]
fn test_apply_action_does_not_mutate() {
    let state = play(4, &[(1, 1), (2, 2)]);
    let features = state.feature_vector();
    let legal = state.legal_actions();
    let rendered = state.to_string();

    let next = state.apply_action(HexMove::new(0, 3)).unwrap();

    assert_eq!(state.feature_vector(), features);
    assert_eq!(state.legal_actions(), legal);
    assert_eq!(state.to_string(), rendered);
    assert_eq!(state.previous_action(), Some(HexMove::new(2, 2)));
    assert_eq!(state.player_to_move(), Player::Maximizer);

    assert_ne!(next.feature_vector(), features);
    assert_eq!(next.stones(), state.stones() + 1);
    assert_eq!(next.previous_action(), Some(HexMove::new(0, 3)));
    assert_eq!(next.player_to_move(), Player::Minimizer);
}

#[test]
fn test_legal_actions_are_empty_cells_without_duplicates() {
    let state = play(3, &[(0, 0), (1, 1), (2, 2)]);
    let actions = state.legal_actions();
    assert_eq!(actions.len(), 6);
    for (i, a) in actions.iter().enumerate() {
        assert_eq!(state.cell(*a), None);
        assert!(!actions[i + 1..].contains(a));
    }
}

#[test]
fn test_illegal_moves_are_rejected() {
    let state = play(3, &[(1, 1)]);
    assert!(matches!(
        state.apply_action(HexMove::new(1, 1)),
        Err(GameError::InvalidMove(_))
    ));
    assert!(matches!(
        state.apply_action(HexMove::new(3, 0)),
        Err(GameError::InvalidMove(_))
    ));

    let won = play(3, &[(0, 1), (0, 0), (1, 1), (1, 0), (2, 1)]);
    assert!(matches!(
        won.apply_action(HexMove::new(2, 2)),
        Err(GameError::InvalidMove(_))
    ));
}

#[test]
fn test_utility_of_running_game_is_illegal_state() {
    let state = HexState::new(3).unwrap();
    assert!(matches!(state.utility(), Err(GameError::IllegalState(_))));
}

#[test]
fn test_feature_vector_layout() {
    let state = play(2, &[(0, 0)]);
    // Maximizer stone at index 0, minimizer to move.
    assert_eq!(state.feature_vector(), vec![1.0, 0.0, 0.0, 0.0, -1.0]);

    let state = state.apply_action(HexMove::new(1, 1)).unwrap();
    assert_eq!(state.feature_vector(), vec![1.0, 0.0, 0.0, -1.0, 1.0]);
}

#[test]
fn test_action_index_matches_row_major() {
    let state = HexState::new(5).unwrap();
    assert_eq!(state.action_index(HexMove::new(0, 0)), 0);
    assert_eq!(state.action_index(HexMove::new(2, 3)), 13);
    assert_eq!(state.action_index(HexMove::new(4, 4)), 24);
}

// =============================================================================
// Nim
// =============================================================================

#[test]
fn test_nim_full_game() {
    let mut state = NimState::new(7, 2).unwrap();
    let mut takes = 0;
    while !state.is_terminal() {
        let take = *state.legal_actions().last().unwrap();
        state = state.apply_action(take).unwrap();
        takes += 1;
    }
    // 2, 2, 2, 1: the fourth take is the minimizer's.
    assert_eq!(takes, 4);
    assert_eq!(state.winner(), Some(Player::Minimizer));
    assert_eq!(state.utility().unwrap(), -1.0);
    assert_eq!(state.previous_action(), Some(1));
}
