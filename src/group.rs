//! Stone group bookkeeping.
//!
//! Besides the liberty count, every group keeps the sum of its liberty
//! indices and the sum of their squares. For `n` values,
//! `n * sum(x^2) == sum(x)^2` holds exactly when all values are equal, so a
//! group is in atari iff that identity holds with `n > 0`. The test is O(1)
//! and never looks at the board.

use crate::board::Point;

/// A maximal connected set of same-colored stones.
///
/// Groups live in a fixed table inside the board and are addressed by a
/// small integer handle, so they survive a by-value copy of the board.
/// A group with `stones == 0` is free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoneGroup {
    /// Number of stones.
    pub stones: u16,
    /// Number of distinct liberties.
    pub liberties: u16,
    /// Sum of liberty indices.
    pub lib_sum: u32,
    /// Sum of squared liberty indices.
    pub lib_sum_sq: u64,
}

impl StoneGroup {
    /// A group holding one stone and no liberties yet.
    pub fn singleton() -> Self {
        Self {
            stones: 1,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.stones == 0
    }

    #[inline]
    pub fn add_liberty(&mut self, lib: Point) {
        let lib = lib as u64;
        self.liberties += 1;
        self.lib_sum += lib as u32;
        self.lib_sum_sq += lib * lib;
    }

    #[inline]
    pub fn remove_liberty(&mut self, lib: Point) {
        let lib = lib as u64;
        debug_assert!(self.liberties > 0, "removing a liberty from a group with none");
        self.liberties -= 1;
        self.lib_sum -= lib as u32;
        self.lib_sum_sq -= lib * lib;
    }

    /// True when the group has exactly one liberty.
    #[inline]
    pub fn is_atari(&self) -> bool {
        let n = self.liberties as u64;
        let sum = self.lib_sum as u64;
        n > 0 && n * self.lib_sum_sq == sum * sum
    }

    /// The single liberty of a group in atari.
    #[inline]
    pub fn atari_liberty(&self) -> Point {
        assert!(self.is_atari(), "group is not in atari: {self:?}");
        (self.lib_sum / self.liberties as u32) as Point
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.liberties == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_liberty_is_atari() {
        let mut g = StoneGroup::singleton();
        g.add_liberty(31);
        assert!(g.is_atari());
        assert_eq!(g.atari_liberty(), 31);
    }

    #[test]
    fn test_two_liberties_are_not_atari() {
        let mut g = StoneGroup::singleton();
        g.add_liberty(31);
        g.add_liberty(42);
        assert!(!g.is_atari());

        g.remove_liberty(31);
        assert!(g.is_atari());
        assert_eq!(g.atari_liberty(), 42);
    }

    #[test]
    fn test_no_liberties_is_captured_not_atari() {
        let mut g = StoneGroup::singleton();
        g.add_liberty(12);
        g.remove_liberty(12);
        assert!(g.is_captured());
        assert!(!g.is_atari());
    }
}
