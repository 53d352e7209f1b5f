//! Stop conditions for the search loop.
//!
//! The search asks its [`StopPredicate`] after every simulation whether to
//! stop. The predicate sees a read-only [`SearchView`] and may use it to
//! report progress. Plain closures work as predicates too:
//!
//! ```
//! use gaugo::stoppers::{SearchView, StopPredicate};
//!
//! fn accepts(_: impl StopPredicate) {}
//!
//! accepts(|_: &SearchView<'_>, sims: u32| sims >= 100);
//! ```

use std::time::{Duration, Instant};

use tracing::info;

use crate::board::{Board, Color};
use crate::tree::SearchTree;

/// Length of the principal variation shown in progress reports.
const REPORT_PV_LEN: usize = 8;

/// Read-only access to a running search.
pub struct SearchView<'a> {
    pub tree: &'a SearchTree,
    pub root: &'a Board,
    pub started: Instant,
}

impl SearchView<'_> {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Win rate of the root position for the side to move.
    pub fn root_winrate(&self) -> Option<f32> {
        let root = self.tree.node(self.tree.root());
        root.winrate(self.root.turn())
    }

    /// The principal variation as space-separated coordinates.
    pub fn pv_string(&self, max_len: usize) -> String {
        self.tree
            .principal_variation(max_len)
            .into_iter()
            .map(|mv| self.root.point_name(mv))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Simulations per second so far.
    pub fn rate(&self, simulations: u32) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 { simulations as f64 / secs } else { 0.0 }
    }
}

pub trait StopPredicate {
    /// Called after `simulations` completed simulations. Return `true` to
    /// end the search.
    fn should_stop(&mut self, view: &SearchView<'_>, simulations: u32) -> bool;
}

impl<F> StopPredicate for F
where
    F: FnMut(&SearchView<'_>, u32) -> bool,
{
    fn should_stop(&mut self, view: &SearchView<'_>, simulations: u32) -> bool {
        self(view, simulations)
    }
}

/// Stop after a fixed number of simulations, or earlier once an optional
/// wall-clock limit is reached. Reports progress every `report_every`
/// simulations.
#[derive(Clone, Debug)]
pub struct SimulationBudget {
    limit: u32,
    time_limit: Option<Duration>,
    report_every: u32,
    gogui: bool,
}

impl SimulationBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            time_limit: None,
            report_every: 0,
            gogui: false,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Report every `period` simulations (0 disables reports).
    pub fn with_reports(mut self, period: u32) -> Self {
        self.report_every = period;
        self
    }

    /// Also write reports as GTP comment lines on stderr, which GoGui shows
    /// in its shell window.
    pub fn with_gogui(mut self, gogui: bool) -> Self {
        self.gogui = gogui;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn report(&self, view: &SearchView<'_>, simulations: u32) {
        let pv = view.pv_string(REPORT_PV_LEN);
        let winrate = view.root_winrate().unwrap_or(0.5);
        let player = view.root.turn();
        info!(
            simulations,
            rate = format_args!("{:.0}", view.rate(simulations)),
            winrate = format_args!("{:.3}", winrate),
            %player,
            pv = %pv,
            "search progress"
        );
        // GoGui wants the bare `#` line on stderr, without the subscriber's prefix.
        if self.gogui {
            let side = if player == Color::Black { "B" } else { "W" };
            eprintln!(
                "# {simulations} sims, {side} winrate {winrate:.3}, pv {pv}"
            );
        }
    }
}

impl StopPredicate for SimulationBudget {
    fn should_stop(&mut self, view: &SearchView<'_>, simulations: u32) -> bool {
        if self.report_every > 0 && simulations % self.report_every == 0 {
            self.report(view, simulations);
        }
        simulations >= self.limit || self.time_limit.is_some_and(|t| view.elapsed() >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist::ZobristTable;
    use std::sync::Arc;

    fn fixture() -> (SearchTree, Board) {
        let board = Board::new(5, Arc::new(ZobristTable::default())).unwrap();
        let tree = SearchTree::new(64, 1, board.hash());
        (tree, board)
    }

    #[test]
    fn test_simulation_budget() {
        let (tree, board) = fixture();
        let view = SearchView {
            tree: &tree,
            root: &board,
            started: Instant::now(),
        };
        let mut budget = SimulationBudget::new(10);
        assert!(!budget.should_stop(&view, 9));
        assert!(budget.should_stop(&view, 10));
    }

    #[test]
    fn test_time_limit() {
        let (tree, board) = fixture();
        let view = SearchView {
            tree: &tree,
            root: &board,
            started: Instant::now(),
        };
        let mut budget = SimulationBudget::new(1_000_000).with_time_limit(Duration::ZERO);
        assert!(budget.should_stop(&view, 1));
        let mut patient = SimulationBudget::new(1_000_000).with_time_limit(Duration::from_secs(3600));
        assert!(!patient.should_stop(&view, 1));
    }

    #[test]
    fn test_closure_predicate() {
        let (tree, board) = fixture();
        let view = SearchView {
            tree: &tree,
            root: &board,
            started: Instant::now(),
        };
        let mut calls = 0;
        let mut stop = |_: &SearchView<'_>, sims: u32| {
            calls += 1;
            sims >= 3
        };
        assert!(!stop.should_stop(&view, 1));
        assert!(stop.should_stop(&view, 3));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_view_of_fresh_tree() {
        let (tree, board) = fixture();
        let view = SearchView {
            tree: &tree,
            root: &board,
            started: Instant::now(),
        };
        assert_eq!(view.root_winrate(), None);
        assert_eq!(view.pv_string(5), "");
    }
}
