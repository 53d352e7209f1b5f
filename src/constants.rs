//! Constants for board geometry and search parameters.
//!
//! The board uses a 1D array representation with a padding ring so that
//! neighbor lookups never need bounds checks. For a board of side `size`,
//! the row stride is `size + 1`: the extra column at `x == size` is the
//! border shared by the right edge of one row and the left edge of the
//! next, and a full border row sits above and below the playable area.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest supported board side.
pub const MIN_BOARD_SIZE: usize = 4;

/// Largest supported board side.
pub const MAX_BOARD_SIZE: usize = 19;

/// Number of array slots needed to hold the padded grid of the largest board.
pub const MAX_INTERSECTIONS: usize = (MAX_BOARD_SIZE + 1) * (MAX_BOARD_SIZE + 2);

/// Default board side.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Pass move marker (index 0 is always border, so it never names a point).
pub const PASS_MOVE: usize = 0;

/// Playouts are cut off after `MAX_GAME_LEN_FACTOR * size * size` moves.
pub const MAX_GAME_LEN_FACTOR: usize = 3;

// =============================================================================
// Hashing
// =============================================================================

/// Seed for the default Zobrist table.
pub const ZOBRIST_SEED: u64 = 0x6bee_2849_cb95_61ca;

/// Hash of the empty board with Black to move. Non-zero so that it never
/// matches an unused superko slot.
pub const EMPTY_BOARD_HASH: u64 = 1;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: u32 = 15_000;

/// Progress report period (number of simulations between reports).
pub const REPORT_PERIOD: u32 = 3_000;

/// UCT exploration constant.
pub const UCT_K: f32 = 0.44;

/// RAVE equivalence parameter: `beta = sqrt(RAVE_EQUIV / (3 * played + RAVE_EQUIV))`.
pub const RAVE_EQUIV: f32 = 500.0;

/// Score given to children that have never been played.
pub const UNVISITED_PRIORITY: f32 = 10_000.0;

/// Minimum visits before a node's children are selected instead of playing out.
pub const EXPAND_VISITS: u32 = 8;

/// A pass child is created when a node has at most this many other children.
pub const PASS_CHILD_CAP: usize = 6;

/// Number of trailing position hashes kept for superko avoidance.
pub const SUPERKO_WINDOW: usize = 8;

// =============================================================================
// Node Pool
// =============================================================================

/// Default number of nodes in one pool block.
pub const POOL_NODES: usize = 1_000_000;

/// Default maximum number of pool blocks.
pub const MAX_POOLS: usize = 50;

/// Default komi.
pub const KOMI: f32 = 7.5;
