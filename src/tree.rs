//! Search tree with arena allocation.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Ownership
//! runs strictly top-down: the tree owns every node, a node's `children` list
//! is the only way to reach its subtree, and the `parent` link is a plain
//! index used for backpropagation only. Dropping the tree drops every state;
//! [`SearchTree::promote`] keeps one subtree and releases the rest.

use std::collections::VecDeque;

use crate::game::{GameError, GameState};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node<S> {
    state: S,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    visits: u32,
    value: f64,
}

impl<S: GameState> Node<S> {
    fn new(state: S, parent: Option<NodeId>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            expanded: false,
            visits: 0,
            value: 0.0,
        }
    }

    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of simulations that passed through this node.
    #[inline]
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Sum of all utilities backpropagated through this node.
    #[inline]
    pub fn value_sum(&self) -> f64 {
        self.value
    }

    /// Mean utility `Q`, 0 for an unvisited node.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    /// Record one simulation result.
    #[inline]
    pub fn update(&mut self, value: f64) {
        self.visits += 1;
        self.value += value;
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

/// Search tree rooted at `NodeId(0)`.
#[derive(Debug, Clone)]
pub struct SearchTree<S> {
    nodes: Vec<Node<S>>,
}

impl<S: GameState> SearchTree<S> {
    /// A tree holding only the root.
    pub fn new(root: S) -> Self {
        Self {
            nodes: vec![Node::new(root, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child holding `state` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, state: S) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(state, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Populate `parent` with one child per state and mark it expanded.
    /// No-op if it was already expanded.
    pub fn expand(&mut self, parent: NodeId, states: impl IntoIterator<Item = S>) {
        if self.nodes[parent.0].expanded {
            return;
        }
        for state in states {
            self.add_child(parent, state);
        }
        self.nodes[parent.0].expanded = true;
    }

    /// Expand `id` with every successor of its state. No-op for terminal or
    /// already expanded nodes.
    pub fn expand_legal(&mut self, id: NodeId) -> Result<(), GameError> {
        let node = self.get(id);
        if node.expanded || node.is_terminal() {
            return Ok(());
        }
        let state = node.state();
        let successors = state
            .legal_actions()
            .into_iter()
            .map(|action| state.apply_action(action))
            .collect::<Result<Vec<_>, _>>()?;
        self.expand(id, successors);
        Ok(())
    }

    /// The child of `id` reached by playing `action`.
    pub fn child_for_action(&self, id: NodeId, action: S::Action) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).state.previous_action() == Some(action))
    }

    /// Call [`Node::update`] on `leaf` and every ancestor up to the root.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.update(value);
            current = node.parent;
        }
    }

    /// Most visited child of `id`, ties broken uniformly at random.
    pub fn best_child(&self, id: NodeId, rng: &mut fastrand::Rng) -> Option<NodeId> {
        let children = &self.get(id).children;
        let most = children.iter().map(|&c| self.get(c).visits).max()?;
        let best: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|&c| self.get(c).visits == most)
            .collect();
        Some(best[rng.usize(..best.len())])
    }

    /// Visits of each child of `id` divided by their total, laid out over the
    /// state's dense action space. All zeros if no child has been visited.
    pub fn visit_distribution(&self, id: NodeId) -> Vec<f32> {
        let node = self.get(id);
        let mut dist = vec![0.0; node.state.action_space()];

        let total: u64 = node.children.iter().map(|&c| self.get(c).visits as u64).sum();
        if total == 0 {
            return dist;
        }

        for &c in &node.children {
            let child = self.get(c);
            if let Some(action) = child.state.previous_action() {
                dist[node.state.action_index(action)] = (child.visits as f64 / total as f64) as f32;
            }
        }
        dist
    }

    /// Keep only the subtree under `child` (a child of the root reached by
    /// the move actually played) and make it the new root. Statistics
    /// inside the subtree are preserved.
    pub fn promote(self, child: NodeId) -> Self {
        let mut old: Vec<Option<Node<S>>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::new();
        // (old id, new parent id)
        let mut queue = VecDeque::from([(child, None::<NodeId>)]);

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let Some(mut node) = old[old_id.0].take() else {
                continue;
            };
            let new_id = NodeId(nodes.len());
            if let Some(p) = new_parent {
                let parent: &mut Node<S> = &mut nodes[p.0];
                parent.children.push(new_id);
            }
            for &c in &node.children {
                queue.push_back((c, Some(new_id)));
            }
            node.parent = new_parent;
            node.children.clear();
            nodes.push(node);
        }

        Self { nodes }
    }
}
