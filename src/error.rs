//! Errors reported to callers for bad external input.
//!
//! Rule violations inside the engine (playing an illegal point, corrupt
//! group bookkeeping) are not represented here: those are bugs and panic.

use crate::board::Color;

/// Errors caused by input coming from outside the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoError {
    /// The requested board side is outside the supported range.
    #[error("invalid size {size}")]
    InvalidBoardSize {
        /// The rejected size.
        size: usize,
    },

    /// A coordinate string does not name a point on the board.
    #[error("invalid coordinate: \"{name}\"")]
    InvalidCoordinate {
        /// The rejected coordinate text.
        name: String,
    },

    /// The move names a real point but is not legal in the current position.
    #[error("illegal move: {name}")]
    IllegalMove {
        /// Name of the point.
        name: String,
    },

    /// A move was given for the player who is not on turn.
    #[error("wrong color: {found} given, {expected} to play")]
    WrongColor {
        /// The player on turn.
        expected: Color,
        /// The player named by the caller.
        found: Color,
    },

    /// A color string is neither black nor white.
    #[error("invalid color: \"{name}\"")]
    InvalidColor {
        /// The rejected color text.
        name: String,
    },

    /// An option value is out of its accepted range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption {
        /// Option name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
