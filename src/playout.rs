//! Monte Carlo playouts (random game simulation).
//!
//! A playout finishes an arbitrary position by playing random legal moves
//! until both players pass, then scores the result with Tromp-Taylor rules.
//! Policies are pluggable through [`PlayoutPolicy`]; [`PureRandom`] is the
//! uniform policy used by default.

use crate::board::{Board, Color, Point};
use crate::constants::{MAX_GAME_LEN_FACTOR, MAX_INTERSECTIONS, PASS_MOVE};

/// Records, per point, which player played there first during one
/// simulation. Used for the all-moves-as-first statistics.
#[derive(Clone)]
pub struct AmafMap {
    first: [Color; MAX_INTERSECTIONS],
}

impl Default for AmafMap {
    fn default() -> Self {
        Self::new()
    }
}

impl AmafMap {
    pub fn new() -> Self {
        Self {
            first: [Color::Empty; MAX_INTERSECTIONS],
        }
    }

    pub fn clear(&mut self) {
        self.first.fill(Color::Empty);
    }

    /// Mark `pt` as played by `player` unless someone played there earlier.
    #[inline]
    pub fn record(&mut self, pt: Point, player: Color) {
        if pt != PASS_MOVE && self.first[pt] == Color::Empty {
            self.first[pt] = player;
        }
    }

    /// The player who first played at `pt`, if any.
    #[inline]
    pub fn first_player(&self, pt: Point) -> Option<Color> {
        match self.first[pt] {
            Color::Empty => None,
            c => Some(c),
        }
    }
}

/// A strategy that turns a position into a finished, scored game.
pub trait PlayoutPolicy {
    /// Play `board` to the end and return the winner. Every move played is
    /// recorded in `amaf`.
    fn playout(&mut self, board: &mut Board, komi: f32, amaf: &mut AmafMap) -> Color;
}

impl<P: PlayoutPolicy + ?Sized> PlayoutPolicy for &mut P {
    fn playout(&mut self, board: &mut Board, komi: f32, amaf: &mut AmafMap) -> Color {
        (**self).playout(board, komi, amaf)
    }
}

/// Winner of a finished position: Black needs an area margin above komi.
pub fn winner(board: &Board, komi: f32) -> Color {
    if board.tromp_taylor_score() as f32 > komi {
        Color::Black
    } else {
        Color::White
    }
}

/// Uniformly random play over legal moves that do not fill own eyes.
pub struct PureRandom {
    rng: fastrand::Rng,
}

impl Default for PureRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl PureRandom {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// A policy with a reproducible move sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Choose a legal, non-eye-filling move.
    ///
    /// Scans the empties list from a random starting slot and wraps around,
    /// so no candidate list is built.
    fn choose_move(&mut self, board: &Board) -> Option<Point> {
        let count = board.empty_count();
        if count == 0 {
            return None;
        }
        let start = self.rng.usize(..count);
        (start..count)
            .chain(0..start)
            .map(|idx| board.empty_at(idx))
            .find(|&pt| board.is_legal_no_eye_filling(pt))
    }
}

impl PlayoutPolicy for PureRandom {
    fn playout(&mut self, board: &mut Board, komi: f32, amaf: &mut AmafMap) -> Color {
        let max_moves = MAX_GAME_LEN_FACTOR * board.size() * board.size();
        let mut moves = 0;
        let mut passes = board.passes().min(1);

        while passes < 2 && moves < max_moves {
            match self.choose_move(board) {
                Some(pt) => {
                    amaf.record(pt, board.turn());
                    board.play(pt);
                    passes = 0;
                }
                None => {
                    board.pass();
                    passes += 1;
                }
            }
            moves += 1;
        }

        winner(board, komi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zobrist::ZobristTable;
    use std::sync::Arc;

    fn board(size: usize) -> Board {
        Board::new(size, Arc::new(ZobristTable::default())).unwrap()
    }

    #[test]
    fn test_amaf_keeps_first_player() {
        let mut amaf = AmafMap::new();
        amaf.record(30, Color::Black);
        amaf.record(30, Color::White);
        assert_eq!(amaf.first_player(30), Some(Color::Black));
        assert_eq!(amaf.first_player(31), None);

        amaf.record(PASS_MOVE, Color::White);
        assert_eq!(amaf.first_player(PASS_MOVE), None);

        amaf.clear();
        assert_eq!(amaf.first_player(30), None);
    }

    #[test]
    fn test_playout_finishes_game() {
        let mut b = board(9);
        let mut policy = PureRandom::with_seed(7);
        let mut amaf = AmafMap::new();
        let result = policy.playout(&mut b, 7.5, &mut amaf);

        assert!(matches!(result, Color::Black | Color::White));
        assert!(
            b.passes() == 2 || b.move_number() >= 3 * 81,
            "playout should end with two passes or hit the length guard"
        );
        assert!(b.points().any(|pt| amaf.first_player(pt).is_some()));
    }

    #[test]
    fn test_playout_is_reproducible_with_seed() {
        let mut first = board(9);
        let mut second = board(9);
        let mut amaf = AmafMap::new();
        PureRandom::with_seed(99).playout(&mut first, 7.5, &mut amaf);
        PureRandom::with_seed(99).playout(&mut second, 7.5, &mut amaf);
        assert_eq!(first.hash(), second.hash());
    }

    #[test]
    fn test_winner_uses_komi() {
        let b = board(5);
        // Empty board scores -25 for Black.
        assert_eq!(winner(&b, 7.5), Color::White);
        assert_eq!(winner(&b, -30.0), Color::Black);
        assert_eq!(winner(&b, -25.0), Color::White);
    }
}
