//! Search tree of visited positions.
//!
//! Nodes are allocated from a [`MemoryPool`] and linked first-child /
//! next-sibling. A node's children are created all at once when it is
//! expanded and are never reordered or freed; the tree is only discarded
//! as a whole. Positions reached through different move orders get
//! distinct nodes (no transpositions).

use crate::board::{Color, Point};
use crate::constants::PASS_MOVE;
use crate::pool::{MemoryPool, NodeId};

/// Statistics of one move in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Move leading to this node (`PASS_MOVE` for a pass).
    pub mv: Point,
    /// Simulations that went through this node.
    pub played: u32,
    /// Of those, simulations won by Black.
    pub wins_black: u32,
    /// Simulations where this move was played later by the same player.
    pub amaf_played: u32,
    /// Of those, simulations won by Black.
    pub amaf_wins_black: u32,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    pub fn new(mv: Point) -> Self {
        Self {
            mv,
            played: 0,
            wins_black: 0,
            amaf_played: 0,
            amaf_wins_black: 0,
            first_child: None,
            next_sibling: None,
        }
    }

    /// Win rate for `player`, or `None` if never played.
    pub fn winrate(&self, player: Color) -> Option<f32> {
        (self.played > 0).then(|| perspective(self.wins_black, self.played, player))
    }

    /// AMAF win rate for `player`, or `None` without AMAF samples.
    pub fn amaf_winrate(&self, player: Color) -> Option<f32> {
        (self.amaf_played > 0).then(|| perspective(self.amaf_wins_black, self.amaf_played, player))
    }

    /// Count one simulation through this node.
    #[inline]
    pub fn record(&mut self, winner: Color) {
        self.played += 1;
        if winner == Color::Black {
            self.wins_black += 1;
        }
    }

    /// Count one all-moves-as-first sample.
    #[inline]
    pub fn record_amaf(&mut self, winner: Color) {
        self.amaf_played += 1;
        if winner == Color::Black {
            self.amaf_wins_black += 1;
        }
    }
}

#[inline]
fn perspective(wins_black: u32, played: u32, player: Color) -> f32 {
    let black = wins_black as f32 / played as f32;
    if player == Color::White { 1.0 - black } else { black }
}

/// Read-only summary of a child, for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildStats {
    pub mv: Point,
    pub played: u32,
    pub winrate: Option<f32>,
    pub amaf_played: u32,
    pub amaf_winrate: Option<f32>,
}

pub struct SearchTree {
    pool: MemoryPool<Node>,
    root: NodeId,
    root_hash: u64,
    exhausted: bool,
}

impl SearchTree {
    /// Create a tree for the position with hash `root_hash`.
    pub fn new(pool_nodes: usize, max_pools: usize, root_hash: u64) -> Self {
        let mut pool = MemoryPool::new(pool_nodes, max_pools);
        let root = pool
            .allocate(Node::new(PASS_MOVE))
            .expect("a fresh pool has room for the root");
        Self {
            pool,
            root,
            root_hash,
            exhausted: false,
        }
    }

    /// Discard every node and start over from a new root position.
    pub fn reset(&mut self, root_hash: u64) {
        self.pool.reset();
        self.root = self
            .pool
            .allocate(Node::new(PASS_MOVE))
            .expect("a reset pool has room for the root");
        self.root_hash = root_hash;
        self.exhausted = false;
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Hash of the position the tree was built for.
    #[inline]
    pub fn root_hash(&self) -> u64 {
        self.root_hash
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.pool[id]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.pool[id]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// True once an expansion was refused for lack of pool space.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[inline]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.pool[id].first_child.is_some()
    }

    /// Iterate over the children of `id` in creation order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            pool: &self.pool,
            next: self.pool[id].first_child,
        }
    }

    /// Create one child of `parent` per move, in order.
    ///
    /// Either every child is created or, if the pool cannot hold them all,
    /// none is and `false` is returned.
    pub fn add_children(&mut self, parent: NodeId, moves: &[Point]) -> bool {
        assert!(!self.is_expanded(parent), "node {parent:?} expanded twice");
        if moves.is_empty() {
            return true;
        }
        if self.pool.remaining() < moves.len() {
            self.exhausted = true;
            return false;
        }

        let mut previous: Option<NodeId> = None;
        for &mv in moves {
            let Some(child) = self.pool.allocate(Node::new(mv)) else {
                unreachable!("pool space was checked before expansion");
            };
            match previous {
                Some(prev) => self.pool[prev].next_sibling = Some(child),
                None => self.pool[parent].first_child = Some(child),
            }
            previous = Some(child);
        }
        true
    }

    /// The most played child of `id`, if any child was played at all.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        let mut most = 0;
        for child in self.children(id) {
            let played = self.pool[child].played;
            if played > most {
                most = played;
                best = Some(child);
            }
        }
        best
    }

    /// The most played line from the root, at most `max_len` moves long.
    pub fn principal_variation(&self, max_len: usize) -> Vec<Point> {
        let mut pv = Vec::new();
        let mut node = self.root;
        while pv.len() < max_len {
            let Some(child) = self.best_child(node) else {
                break;
            };
            pv.push(self.pool[child].mv);
            node = child;
        }
        pv
    }

    /// Statistics of every child of `id`, with win rates seen by `player`.
    pub fn child_stats(&self, id: NodeId, player: Color) -> Vec<ChildStats> {
        self.children(id)
            .map(|child| {
                let node = &self.pool[child];
                ChildStats {
                    mv: node.mv,
                    played: node.played,
                    winrate: node.winrate(player),
                    amaf_played: node.amaf_played,
                    amaf_winrate: node.amaf_winrate(player),
                }
            })
            .collect()
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    pool: &'a MemoryPool<Node>,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.pool[current].next_sibling;
        Some(current)
    }
}
