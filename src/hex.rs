//! Hex board representation and move execution.
//!
//! The board is an NxN rhombus of hexagonal cells stored row-major in a flat
//! vector. The maximizer owns the top and bottom rows and wins by joining
//! them; the minimizer owns the left and right columns.
//!
//! Win detection is incremental: each player has a [`DisjointSet`] over the
//! cells plus two virtual nodes standing for that player's borders. Placing a
//! stone unions it with same-owner neighbours and with any border it touches,
//! and the player has won as soon as its two border nodes share a set.
//!
//! The neighbour table depends only on the board size, so it is computed once
//! and shared between all states of a game through an [`Arc`].

use std::fmt;
use std::sync::Arc;

use crate::constants::{HEX_DELTA, MAX_BOARD_SIZE};
use crate::disjoint_set::DisjointSet;
use crate::game::{GameError, GameState, Player};

/// A cell on the board, `(row, col)` from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexMove {
    pub row: usize,
    pub col: usize,
}

impl HexMove {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index on a board of the given size.
    #[inline]
    pub fn index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    /// Inverse of [`HexMove::index`].
    #[inline]
    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }
}

impl fmt::Display for HexMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl From<(usize, usize)> for HexMove {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Size-dependent data shared by every state of one game.
#[derive(Debug)]
struct Geometry {
    size: usize,
    /// Neighbour indices of each cell (2 to 6 entries).
    neighbors: Vec<Vec<usize>>,
}

impl Geometry {
    fn new(size: usize) -> Self {
        let neighbors = (0..size * size)
            .map(|idx| {
                let row = (idx / size) as isize;
                let col = (idx % size) as isize;
                HEX_DELTA
                    .iter()
                    .map(|&(dr, dc)| (row + dr, col + dc))
                    .filter(|&(r, c)| r >= 0 && c >= 0 && (r as usize) < size && (c as usize) < size)
                    .map(|(r, c)| r as usize * size + c as usize)
                    .collect()
            })
            .collect();
        Self { size, neighbors }
    }

    #[inline]
    fn cells(&self) -> usize {
        self.size * self.size
    }

    /// Index of the virtual node for a player's first border (top row or
    /// left column). The second border is the next index.
    #[inline]
    fn border_node(&self) -> usize {
        self.cells()
    }

    /// Which of `player`'s borders the cell touches.
    fn touches_borders(&self, player: Player, mv: HexMove) -> (bool, bool) {
        let last = self.size - 1;
        match player {
            Player::Maximizer => (mv.row == 0, mv.row == last),
            Player::Minimizer => (mv.col == 0, mv.col == last),
        }
    }
}

#[inline]
fn slot(player: Player) -> usize {
    match player {
        Player::Maximizer => 0,
        Player::Minimizer => 1,
    }
}

/// A Hex position.
///
/// Cloning is cheap: the geometry is shared and the rest is three flat
/// vectors sized by the board.
#[derive(Debug, Clone)]
pub struct HexState {
    geometry: Arc<Geometry>,
    cells: Vec<Option<Player>>,
    to_move: Player,
    winner: Option<Player>,
    last_move: Option<HexMove>,
    /// One union-find per player, indexed by [`slot`].
    groups: [DisjointSet; 2],
}

impl HexState {
    /// Empty board with the maximizer to move.
    ///
    /// # Errors
    /// [`GameError::InvalidBoard`] if `size` is 0 or above [`MAX_BOARD_SIZE`].
    pub fn new(size: usize) -> Result<Self, GameError> {
        Self::with_first_player(size, Player::Maximizer)
    }

    /// Empty board with `first` to move.
    pub fn with_first_player(size: usize, first: Player) -> Result<Self, GameError> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(GameError::InvalidBoard(format!(
                "board size {size} not in 1..={MAX_BOARD_SIZE}"
            )));
        }

        let geometry = Arc::new(Geometry::new(size));
        let nodes = geometry.cells() + 2;
        Ok(Self {
            geometry,
            cells: vec![None; size * size],
            to_move: first,
            winner: None,
            last_move: None,
            groups: [DisjointSet::new(nodes), DisjointSet::new(nodes)],
        })
    }

    /// Play a sequence of moves from an empty board, alternating from the
    /// maximizer.
    pub fn from_moves(size: usize, moves: &[(usize, usize)]) -> Result<Self, GameError> {
        moves
            .iter()
            .try_fold(Self::new(size)?, |state, &mv| state.apply_action(mv.into()))
    }

    /// Board side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.geometry.size
    }

    /// Owner of a cell, `None` if empty or off the board.
    pub fn cell(&self, mv: HexMove) -> Option<Player> {
        if mv.row >= self.size() || mv.col >= self.size() {
            return None;
        }
        self.cells[mv.index(self.size())]
    }

    /// The winner, once decided.
    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Number of stones on the board.
    pub fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Neighbours of a cell on this board. Empty for a cell off the board.
    pub fn neighbors(&self, mv: HexMove) -> impl Iterator<Item = HexMove> + '_ {
        let size = self.size();
        let adjacent: &[usize] = if mv.row < size && mv.col < size {
            &self.geometry.neighbors[mv.index(size)]
        } else {
            &[]
        };
        adjacent.iter().map(move |&i| HexMove::from_index(i, size))
    }

    fn is_legal(&self, mv: HexMove) -> bool {
        self.winner.is_none()
            && mv.row < self.size()
            && mv.col < self.size()
            && self.cells[mv.index(self.size())].is_none()
    }

    /// Place the mover's stone, update connectivity, and pass the turn.
    fn place(&mut self, mv: HexMove) {
        let geometry = Arc::clone(&self.geometry);
        let player = self.to_move;
        let idx = mv.index(geometry.size);
        self.cells[idx] = Some(player);

        let groups = &mut self.groups[slot(player)];
        for &n in &geometry.neighbors[idx] {
            if self.cells[n] == Some(player) {
                groups.union(idx, n);
            }
        }

        let first = geometry.border_node();
        let second = first + 1;
        let (on_first, on_second) = geometry.touches_borders(player, mv);
        if on_first {
            groups.union(idx, first);
        }
        if on_second {
            groups.union(idx, second);
        }

        if self.winner.is_none() && groups.connected(first, second) {
            self.winner = Some(player);
        }

        self.last_move = Some(mv);
        self.to_move = player.opponent();
    }
}

impl GameState for HexState {
    type Action = HexMove;

    #[inline]
    fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    fn legal_actions(&self) -> Vec<HexMove> {
        if self.is_terminal() {
            return Vec::new();
        }
        let size = self.size();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| HexMove::from_index(i, size))
            .collect()
    }

    fn apply_action(&self, action: HexMove) -> Result<Self, GameError> {
        if !self.is_legal(action) {
            let size = self.size();
            return Err(GameError::InvalidMove(format!(
                "{action} is not playable on this {size}x{size} board"
            )));
        }
        let mut next = self.clone();
        next.place(action);
        Ok(next)
    }

    fn utility(&self) -> Result<f64, GameError> {
        self.winner
            .map(Player::sign)
            .ok_or_else(|| GameError::IllegalState("utility of an unfinished game".into()))
    }

    fn feature_vector(&self) -> Vec<f32> {
        let mut features: Vec<f32> = self
            .cells
            .iter()
            .map(|c| c.map_or(0.0, |p| p.sign() as f32))
            .collect();
        features.push(self.to_move.sign() as f32);
        features
    }

    #[inline]
    fn previous_action(&self) -> Option<HexMove> {
        self.last_move
    }

    #[inline]
    fn player_to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    fn action_space(&self) -> usize {
        self.geometry.cells()
    }

    #[inline]
    fn action_index(&self, action: HexMove) -> usize {
        action.index(self.size())
    }
}

/// Renders the rhombus with each row shifted right by one more space:
/// `O` maximizer, `X` minimizer, `.` empty.
impl fmt::Display for HexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for row in 0..size {
            write!(f, "{:indent$}", "", indent = row)?;
            for col in 0..size {
                let ch = match self.cells[row * size + col] {
                    Some(Player::Maximizer) => 'O',
                    Some(Player::Minimizer) => 'X',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
