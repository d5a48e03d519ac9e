//! Dice engine for Würfelbecher.
//!
//! Provides the fixed die catalog (d4 through d100 plus the narrative plot
//! die), insertion-ordered dice pools, a cryptographically secure random
//! source, and resolution of a whole pool into per-kind outcomes.

pub mod dice;
pub mod error;
pub mod random;

pub use dice::roll::{GroupOutcome, GroupResults, RollOutcome, resolve};
pub use dice::{DicePool, DieKind, MAX_NOTATION_DICE, PlotOutcome};
pub use error::{DiceError, DiceResult};
pub use random::{OsRandom, RandomSource, roll_face};
