//! Engine options.
//!
//! The same struct serves as the command-line surface (flattened into the
//! clap CLI) and as the configuration read by the board and the search.

use clap::Args;

use crate::constants::{
    DEFAULT_BOARD_SIZE, EXPAND_VISITS, KOMI, MAX_BOARD_SIZE, MAX_POOLS, MIN_BOARD_SIZE, N_SIMS,
    PASS_CHILD_CAP, POOL_NODES, REPORT_PERIOD, UCT_K,
};
use crate::error::GoError;

#[derive(Debug, Clone, PartialEq, Args)]
pub struct Options {
    /// Board size (4 to 19)
    #[arg(short = 's', long = "boardsize", default_value_t = DEFAULT_BOARD_SIZE)]
    pub board_size: usize,

    /// Maximum number of node pool blocks
    #[arg(long = "pools", default_value_t = MAX_POOLS)]
    pub pool_blocks: usize,

    /// Number of tree nodes in one pool block
    #[arg(short = 'p', long = "tpnodes", default_value_t = POOL_NODES)]
    pub pool_nodes: usize,

    /// Komi given to White
    #[arg(short = 'k', long, default_value_t = KOMI, allow_negative_numbers = true)]
    pub komi: f32,

    /// Verbosity: 0 silent, 1 periodic summary, 2 verbose
    #[arg(short = 'v', long, default_value_t = 1)]
    pub verbosity: u8,

    /// Visits a node needs before its children are searched
    #[arg(long = "expand", default_value_t = EXPAND_VISITS)]
    pub expansion_visits: u32,

    /// Emit search diagnostics as GTP comment lines for GoGui
    #[arg(long)]
    pub gogui: bool,

    /// Simulations per move
    #[arg(long = "sims", default_value_t = N_SIMS)]
    pub simulations: u32,

    /// Simulations between progress reports (0 disables them)
    #[arg(long = "report", default_value_t = REPORT_PERIOD)]
    pub report_every: u32,

    /// Optional wall-clock limit per move, in seconds
    #[arg(long = "time")]
    pub time_limit: Option<f64>,

    /// UCT exploration constant
    #[arg(long = "uctk", default_value_t = UCT_K)]
    pub uct_k: f32,

    /// Offer a pass child when a node has at most this many other moves
    #[arg(long = "passcap", default_value_t = PASS_CHILD_CAP)]
    pub pass_cap: usize,

    /// Seed for the playout random generator
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            pool_blocks: MAX_POOLS,
            pool_nodes: POOL_NODES,
            komi: KOMI,
            verbosity: 1,
            expansion_visits: EXPAND_VISITS,
            gogui: false,
            simulations: N_SIMS,
            report_every: REPORT_PERIOD,
            time_limit: None,
            uct_k: UCT_K,
            pass_cap: PASS_CHILD_CAP,
            seed: None,
        }
    }
}

impl Options {
    /// Check ranges that clap cannot express.
    pub fn validate(&self) -> Result<(), GoError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(GoError::InvalidBoardSize {
                size: self.board_size,
            });
        }
        let invalid = |name, reason: &str| {
            Err(GoError::InvalidOption {
                name,
                reason: reason.to_string(),
            })
        };
        if self.pool_nodes == 0 {
            return invalid("tpnodes", "must be positive");
        }
        if self.pool_blocks == 0 {
            return invalid("pools", "must be positive");
        }
        if self.pool_nodes.saturating_mul(self.pool_blocks) > u32::MAX as usize {
            return invalid("tpnodes", "pool too large");
        }
        if self.expansion_visits == 0 {
            return invalid("expand", "must be at least 1");
        }
        if self.simulations == 0 {
            return invalid("sims", "must be positive");
        }
        if self.verbosity > 2 {
            return invalid("verbosity", "must be 0, 1 or 2");
        }
        if !self.komi.is_finite() {
            return invalid("komi", "must be a finite number");
        }
        if let Some(t) = self.time_limit {
            if !(t.is_finite() && t > 0.0) {
                return invalid("time", "must be a positive number of seconds");
            }
        }
        Ok(())
    }
}
