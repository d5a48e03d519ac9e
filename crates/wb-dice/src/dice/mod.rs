//! Die catalog, pools, and rolling.
//!
//! The catalog is fixed: the seven standard polyhedral dice (d4 through d100)
//! and the plot die, a d6 whose faces read as narrative outcomes instead of
//! numbers.

pub mod plot;
pub mod pool;
pub mod roll;

pub use plot::PlotOutcome;
pub use pool::{DicePool, MAX_NOTATION_DICE};

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};

/// A die from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieKind {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// Six-sided die mapped to complications and opportunities.
    Plot,
}

impl DieKind {
    /// Every die in the catalog, in the order it is offered to users.
    pub const CATALOG: [DieKind; 8] = [
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
        Self::Plot,
    ];

    /// Returns the number of faces on this die.
    pub fn faces(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 | Self::Plot => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }

    /// Returns true for the plot die, which contributes no numeric total.
    pub fn is_plot(self) -> bool {
        matches!(self, Self::Plot)
    }

    /// Short label used on buttons ("d6", "Plot").
    pub fn label(self) -> &'static str {
        match self {
            Self::D4 => "d4",
            Self::D6 => "d6",
            Self::D8 => "d8",
            Self::D10 => "d10",
            Self::D12 => "d12",
            Self::D20 => "d20",
            Self::D100 => "d100",
            Self::Plot => "Plot",
        }
    }

    /// Name used in prose ("d6", "Plot die").
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Plot => "Plot die",
            other => other.label(),
        }
    }

    /// Key used in pool summaries ("d6", "plot").
    pub fn pool_key(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            other => other.label(),
        }
    }

    /// Parse a die from a tag like "d20", "D6", or "plot".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "d4" => Some(Self::D4),
            "d6" => Some(Self::D6),
            "d8" => Some(Self::D8),
            "d10" => Some(Self::D10),
            "d12" => Some(Self::D12),
            "d20" => Some(Self::D20),
            "d100" | "d%" => Some(Self::D100),
            "plot" | "dplot" => Some(Self::Plot),
            _ => None,
        }
    }
}

impl std::str::FromStr for DieKind {
    type Err = DiceError;

    fn from_str(s: &str) -> DiceResult<Self> {
        Self::from_str_tag(s).ok_or_else(|| DiceError::UnknownDie(s.trim().to_string()))
    }
}

impl std::fmt::Display for DieKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pool_key())
    }
}
