//! Zobrist keys for incremental position hashing.
//!
//! The table is built once, explicitly, and shared read-only by every board
//! that should produce comparable hashes. Two tables built from the same
//! seed are identical.

use crate::board::{Color, Point};
use crate::constants::{MAX_INTERSECTIONS, ZOBRIST_SEED};

/// Per-intersection random keys for stones and ko, plus the turn key.
#[derive(Clone)]
pub struct ZobristTable {
    black: [u64; MAX_INTERSECTIONS],
    white: [u64; MAX_INTERSECTIONS],
    ko: [u64; MAX_INTERSECTIONS],
    turn: u64,
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new(ZOBRIST_SEED)
    }
}

impl ZobristTable {
    /// Build a table from the given seed.
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut table = Self {
            black: [0; MAX_INTERSECTIONS],
            white: [0; MAX_INTERSECTIONS],
            ko: [0; MAX_INTERSECTIONS],
            turn: 0,
        };
        for pt in 0..MAX_INTERSECTIONS {
            table.black[pt] = rng.u64(..);
            table.white[pt] = rng.u64(..);
            table.ko[pt] = rng.u64(..);
        }
        table.turn = rng.u64(..);
        table
    }

    /// Key of a stone of `color` at `pt`. Empty and border have no key.
    #[inline]
    pub fn stone(&self, color: Color, pt: Point) -> u64 {
        match color {
            Color::Black => self.black[pt],
            Color::White => self.white[pt],
            Color::Empty | Color::Border => 0,
        }
    }

    /// Key of the ko state at `pt`.
    #[inline]
    pub fn ko(&self, pt: Point) -> u64 {
        self.ko[pt]
    }

    /// Key toggled on every change of turn.
    #[inline]
    pub fn turn(&self) -> u64 {
        self.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_keys() {
        let a = ZobristTable::new(42);
        let b = ZobristTable::new(42);
        for pt in 0..MAX_INTERSECTIONS {
            assert_eq!(a.stone(Color::Black, pt), b.stone(Color::Black, pt));
            assert_eq!(a.ko(pt), b.ko(pt));
        }
        assert_eq!(a.turn(), b.turn());
    }

    #[test]
    fn test_all_keys_are_unique() {
        let table = ZobristTable::default();
        let mut keys = Vec::with_capacity(3 * MAX_INTERSECTIONS + 1);
        for pt in 0..MAX_INTERSECTIONS {
            keys.push(table.stone(Color::Black, pt));
            keys.push(table.stone(Color::White, pt));
            keys.push(table.ko(pt));
        }
        keys.push(table.turn());

        let count = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), count, "some Zobrist keys collide");
    }

    #[test]
    fn test_empty_and_border_have_no_key() {
        let table = ZobristTable::default();
        assert_eq!(table.stone(Color::Empty, 30), 0);
        assert_eq!(table.stone(Color::Border, 0), 0);
    }
}
