//! Plot die outcomes.
//!
//! A d6 read as a narrative result: face 1 is a major complication, face 2 a
//! minor one, faces 3-4 mean nothing happens, and faces 5-6 open an
//! opportunity.

use serde::{Deserialize, Serialize};

/// The narrative outcome of a single plot die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotOutcome {
    /// A complication with a +4 severity (face 1).
    MajorComplication,
    /// A complication with a +2 severity (face 2).
    MinorComplication,
    /// No narrative effect (faces 3-4).
    Nothing,
    /// An opening in the player's favor (faces 5-6).
    Opportunity,
}

impl PlotOutcome {
    /// Map a rolled face (1-6) to its outcome.
    pub fn from_face(face: u32) -> Self {
        match face {
            0..=1 => Self::MajorComplication,
            2 => Self::MinorComplication,
            3..=4 => Self::Nothing,
            _ => Self::Opportunity,
        }
    }
}

impl std::fmt::Display for PlotOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MajorComplication => write!(f, "Complication +4"),
            Self::MinorComplication => write!(f, "Complication +2"),
            Self::Nothing => write!(f, "Nothing happens"),
            Self::Opportunity => write!(f, "Opportunity"),
        }
    }
}
