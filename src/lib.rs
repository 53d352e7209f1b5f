//! gaugo: a Monte Carlo Go engine core.
//!
//! This crate provides a Go rules engine tuned for fast random playouts and
//! a UCT-RAVE Monte Carlo Tree Search on top of it.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits and search parameters
//! - [`board`] - Board state, groups, liberties, ko and Zobrist hashing
//! - [`group`] - Per-group liberty statistics with an O(1) atari test
//! - [`zobrist`] - Seeded Zobrist key tables
//! - [`playout`] - Random game simulation for position evaluation
//! - [`pool`] - Block allocator for tree nodes
//! - [`tree`] - Search tree storage and diagnostics
//! - [`mcts`] - Monte Carlo Tree Search with UCT-RAVE
//! - [`stoppers`] - Conditions that end a search
//! - [`options`] - Engine configuration
//! - [`gtp`] - Go Text Protocol front end
//! - [`error`] - Errors for bad external input
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use gaugo::board::Board;
//! use gaugo::mcts::UctSearch;
//! use gaugo::options::Options;
//! use gaugo::playout::PureRandom;
//! use gaugo::stoppers::SearchView;
//! use gaugo::zobrist::ZobristTable;
//!
//! let mut board = Board::new(9, Arc::new(ZobristTable::default())).unwrap();
//! let history = vec![board.hash()];
//! board.play(board.parse_point("E5").unwrap());
//!
//! // Run 200 simulations to find White's reply
//! let options = Options { pool_nodes: 10_000, ..Options::default() };
//! let stop = |_: &SearchView<'_>, sims: u32| sims >= 200;
//! let mut search = UctSearch::new(&board, &history, &options, PureRandom::with_seed(1), stop);
//! let best = search.run();
//! println!("Best move: {}", board.point_name(best));
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod group;
pub mod gtp;
pub mod mcts;
pub mod options;
pub mod playout;
pub mod pool;
pub mod stoppers;
pub mod tree;
pub mod zobrist;
