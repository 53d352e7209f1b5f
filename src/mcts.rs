//! Monte Carlo Tree Search with UCT-RAVE.
//!
//! Each simulation starts from a copy of the root position and:
//! - descends the tree, picking children by UCT blended with AMAF (RAVE)
//!   statistics,
//! - expands a leaf once it is reached, offering every legal move that does
//!   not fill an own eye and does not repeat one of the last
//!   [`SUPERKO_WINDOW`] positions on the path,
//! - finishes the game with the playout policy,
//! - propagates the winner back up the path, updating AMAF counts of the
//!   siblings whose move the same player made later in the simulation.
//!
//! The search runs until its [`StopPredicate`] says so and answers the most
//! visited root move.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Color, Point};
use crate::constants::{PASS_MOVE, RAVE_EQUIV, SUPERKO_WINDOW, UNVISITED_PRIORITY};
use crate::options::Options;
use crate::playout::{AmafMap, PlayoutPolicy, PureRandom, winner};
use crate::pool::NodeId;
use crate::stoppers::{SearchView, SimulationBudget, StopPredicate};
use crate::tree::{ChildStats, Node, SearchTree};

/// The most recent position hashes along a game or search path.
#[derive(Clone, Copy, Debug)]
pub struct SuperkoWindow {
    keys: [u64; SUPERKO_WINDOW],
    len: usize,
    next: usize,
}

impl Default for SuperkoWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SuperkoWindow {
    pub fn new() -> Self {
        Self {
            keys: [0; SUPERKO_WINDOW],
            len: 0,
            next: 0,
        }
    }

    /// A window holding the tail of `history` (oldest first).
    pub fn from_history(history: &[u64]) -> Self {
        let mut window = Self::new();
        let start = history.len().saturating_sub(SUPERKO_WINDOW);
        for &key in &history[start..] {
            window.push(key);
        }
        window
    }

    /// Add a hash, dropping the oldest one when full.
    #[inline]
    pub fn push(&mut self, key: u64) {
        self.keys[self.next] = key;
        self.next = (self.next + 1) % SUPERKO_WINDOW;
        self.len = (self.len + 1).min(SUPERKO_WINDOW);
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.keys[..self.len].contains(&key)
    }

    /// The most recently pushed hash.
    pub fn last(&self) -> Option<u64> {
        (self.len > 0).then(|| self.keys[(self.next + SUPERKO_WINDOW - 1) % SUPERKO_WINDOW])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Selection priority of `child` for `player`, the side choosing among the
/// children of a node played `parent_played` times.
///
/// Unvisited children always come first; among them a better AMAF record
/// breaks the tie.
pub fn uct_rave_score(child: &Node, parent_played: u32, player: Color, uct_k: f32) -> f32 {
    if child.played == 0 {
        return UNVISITED_PRIORITY + child.amaf_winrate(player).unwrap_or(0.5);
    }
    let played = child.played as f32;
    let value = child.winrate(player).unwrap_or(0.5);
    let amaf = child.amaf_winrate(player).unwrap_or(value);
    let beta = (RAVE_EQUIV / (3.0 * played + RAVE_EQUIV)).sqrt();
    let exploration = uct_k * ((parent_played.max(1) as f32).ln() / (5.0 * played)).sqrt();
    (1.0 - beta) * value + beta * amaf + exploration
}

/// A UCT-RAVE search rooted at one position.
pub struct UctSearch<P, S> {
    root: Board,
    history: SuperkoWindow,
    tree: SearchTree,
    policy: P,
    stopper: S,
    komi: f32,
    expansion_visits: u32,
    uct_k: f32,
    pass_cap: usize,
    simulations: u32,
    started: Instant,
    warned_full: bool,
}

impl<P: PlayoutPolicy, S: StopPredicate> UctSearch<P, S> {
    /// Prepare a search of `root`. `history` holds the hashes of the game's
    /// previous positions, oldest first; positions in its tail cannot be
    /// repeated by moves in the tree.
    pub fn new(root: &Board, history: &[u64], options: &Options, policy: P, stopper: S) -> Self {
        Self {
            root: root.clone(),
            history: Self::window_for(root, history),
            tree: SearchTree::new(options.pool_nodes, options.pool_blocks, root.hash()),
            policy,
            stopper,
            komi: options.komi,
            expansion_visits: options.expansion_visits,
            uct_k: options.uct_k,
            pass_cap: options.pass_cap,
            simulations: 0,
            started: Instant::now(),
            warned_full: false,
        }
    }

    fn window_for(root: &Board, history: &[u64]) -> SuperkoWindow {
        let mut window = SuperkoWindow::from_history(history);
        if window.last() != Some(root.hash()) {
            window.push(root.hash());
        }
        window
    }

    /// Throw the tree away and search a new root position.
    pub fn set_root(&mut self, root: &Board, history: &[u64]) {
        self.root.clone_from(root);
        self.history = Self::window_for(root, history);
        self.tree.reset(root.hash());
        self.simulations = 0;
        self.warned_full = false;
    }

    pub fn stopper_mut(&mut self) -> &mut S {
        &mut self.stopper
    }

    /// Run simulations until the stop predicate fires and return the move to
    /// play (`PASS_MOVE` to pass).
    pub fn run(&mut self) -> Point {
        if self.root.passes() >= 2 || self.root.must_pass() {
            debug!(
                passes = self.root.passes(),
                "no move worth searching, passing"
            );
            return PASS_MOVE;
        }

        self.started = Instant::now();
        self.simulations = 0;
        let root_id = self.tree.root();
        let mut board = self.root.clone();
        let mut amaf = AmafMap::new();

        loop {
            board.clone_from(&self.root);
            amaf.clear();
            let mut window = self.history;
            self.simulate(&mut board, root_id, &mut window, &mut amaf);
            self.simulations += 1;

            let view = SearchView {
                tree: &self.tree,
                root: &self.root,
                started: self.started,
            };
            if self.stopper.should_stop(&view, self.simulations) {
                break;
            }
        }

        let best = self
            .tree
            .best_child(root_id)
            .map_or(PASS_MOVE, |child| self.tree.node(child).mv);
        debug!(
            simulations = self.simulations,
            nodes = self.tree.len(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            best = %self.root.point_name(best),
            "search finished"
        );
        best
    }

    /// One simulation from node `id`, whose position is on `board`.
    /// Returns the winner.
    fn simulate(
        &mut self,
        board: &mut Board,
        id: NodeId,
        window: &mut SuperkoWindow,
        amaf: &mut AmafMap,
    ) -> Color {
        let turn = board.turn();

        let result = if board.passes() >= 2 {
            winner(board, self.komi)
        } else {
            if self.tree.node(id).played < self.expansion_visits && !self.tree.is_expanded(id) {
                self.expand(board, id, window);
            }
            let child = if self.tree.node(id).played >= self.expansion_visits {
                self.select(id, turn)
            } else {
                None
            };
            match child {
                Some(child) => {
                    let mv = self.tree.node(child).mv;
                    amaf.record(mv, turn);
                    board.play_or_pass(mv);
                    window.push(board.hash());
                    self.simulate(board, child, window, amaf)
                }
                None => self.policy.playout(board, self.komi, amaf),
            }
        };

        self.tree.node_mut(id).record(result);
        self.update_amaf(id, turn, result, amaf);
        result
    }

    /// Create the children of `id`. Refused silently (apart from a single
    /// warning) when the node pool is full.
    fn expand(&mut self, board: &Board, id: NodeId, window: &SuperkoWindow) {
        let mut moves: Vec<Point> = board
            .empties()
            .filter(|&pt| board.is_legal_no_eye_filling(pt) && !window.contains(board.child_hash(pt)))
            .collect();
        if moves.len() <= self.pass_cap {
            moves.push(PASS_MOVE);
        }

        if !self.tree.add_children(id, &moves) && !self.warned_full {
            warn!(
                nodes = self.tree.len(),
                "node pool exhausted, tree will not grow further"
            );
            self.warned_full = true;
        }
    }

    /// The child of `id` with the best UCT-RAVE score for `player`.
    fn select(&self, id: NodeId, player: Color) -> Option<NodeId> {
        let parent_played = self.tree.node(id).played;
        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;
        for child in self.tree.children(id) {
            let score = uct_rave_score(self.tree.node(child), parent_played, player, self.uct_k);
            if score > best_score {
                best_score = score;
                best = Some(child);
            }
        }
        best
    }

    /// Credit every child of `id` whose move `player` made first somewhere
    /// later in this simulation.
    fn update_amaf(&mut self, id: NodeId, player: Color, result: Color, amaf: &AmafMap) {
        let mut next = self.tree.node(id).first_child;
        while let Some(child) = next {
            let node = self.tree.node_mut(child);
            if node.mv != PASS_MOVE && amaf.first_player(node.mv) == Some(player) {
                node.record_amaf(result);
            }
            next = node.next_sibling;
        }
    }

    pub fn root(&self) -> &Board {
        &self.root
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Simulations run by the last call to [`UctSearch::run`].
    pub fn simulations(&self) -> u32 {
        self.simulations
    }

    pub fn principal_variation(&self, max_len: usize) -> Vec<Point> {
        self.tree.principal_variation(max_len)
    }

    /// Statistics of the root's children from the side to move.
    pub fn root_stats(&self) -> Vec<ChildStats> {
        self.tree.child_stats(self.tree.root(), self.root.turn())
    }

    /// Read-only view of the current search state.
    pub fn view(&self) -> SearchView<'_> {
        SearchView {
            tree: &self.tree,
            root: &self.root,
            started: self.started,
        }
    }
}

/// The stop predicate described by `options`.
pub fn budget_for(options: &Options) -> SimulationBudget {
    let mut budget = SimulationBudget::new(options.simulations).with_gogui(options.gogui);
    if options.verbosity > 0 {
        budget = budget.with_reports(options.report_every);
    }
    if let Some(secs) = options.time_limit {
        budget = budget.with_time_limit(Duration::from_secs_f64(secs));
    }
    budget
}

/// Playout policy described by `options`.
pub fn policy_for(options: &Options) -> PureRandom {
    options.seed.map_or_else(PureRandom::new, PureRandom::with_seed)
}

/// Search `board` with the default policy and stop predicate and return the
/// chosen move.
pub fn search_move(board: &Board, history: &[u64], options: &Options) -> Point {
    let mut search = UctSearch::new(
        board,
        history,
        options,
        policy_for(options),
        budget_for(options),
    );
    search.run()
}
