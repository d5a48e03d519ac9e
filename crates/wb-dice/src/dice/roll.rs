//! Pool resolution and roll results.

use serde::{Deserialize, Serialize};

use super::{DicePool, DieKind, PlotOutcome};
use crate::error::DiceResult;
use crate::random::{RandomSource, roll_face};

/// What a group of same-kind dice produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupResults {
    /// Numeric dice: each value in `[1, faces]` and their sum.
    Numeric {
        /// Individual values in draw order.
        values: Vec<u32>,
        /// Sum of `values`.
        subtotal: u32,
    },
    /// Plot dice: one narrative outcome per die, in draw order.
    Plot {
        /// Individual outcomes in draw order.
        outcomes: Vec<PlotOutcome>,
    },
}

/// The result of rolling every die of one kind in a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// The kind of die rolled.
    pub kind: DieKind,
    /// The raw faces drawn, in draw order.
    pub faces: Vec<u32>,
    /// The interpreted results.
    pub results: GroupResults,
}

impl GroupOutcome {
    /// Number of dice rolled in this group.
    pub fn count(&self) -> usize {
        self.faces.len()
    }

    /// Numeric contribution to the grand total (0 for plot dice).
    pub fn subtotal(&self) -> u32 {
        match &self.results {
            GroupResults::Numeric { subtotal, .. } => *subtotal,
            GroupResults::Plot { .. } => 0,
        }
    }
}

impl std::fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.results {
            GroupResults::Numeric { values, subtotal } => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}] = {subtotal}", values.join(", "))
            }
            GroupResults::Plot { outcomes } => {
                let labels: Vec<String> = outcomes.iter().map(|o| o.to_string()).collect();
                write!(f, "[{}]", labels.join(", "))
            }
        }
    }
}

/// The result of rolling an entire dice pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// One group per pool entry, in pool insertion order.
    pub groups: Vec<GroupOutcome>,
    /// Sum of all numeric subtotals. Plot dice never contribute.
    pub grand_total: u32,
}

impl RollOutcome {
    /// Returns true if nothing was rolled.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group for a given kind, if it was in the pool.
    pub fn group(&self, kind: DieKind) -> Option<&GroupOutcome> {
        self.groups.iter().find(|g| g.kind == kind)
    }
}

/// Roll every die in `pool`.
///
/// Groups come back in pool insertion order and faces within a group in draw
/// order. The first failed draw aborts the whole roll. Totals saturate at
/// `u32::MAX`.
pub fn resolve(pool: &DicePool, source: &dyn RandomSource) -> DiceResult<RollOutcome> {
    let mut groups = Vec::new();
    let mut grand_total: u32 = 0;

    for (kind, count) in pool.entries() {
        let faces = (0..count)
            .map(|_| roll_face(source, kind.faces()))
            .collect::<DiceResult<Vec<u32>>>()?;

        let results = if kind.is_plot() {
            GroupResults::Plot {
                outcomes: faces.iter().map(|&f| PlotOutcome::from_face(f)).collect(),
            }
        } else {
            let subtotal = faces.iter().fold(0u32, |sum, &f| sum.saturating_add(f));
            grand_total = grand_total.saturating_add(subtotal);
            GroupResults::Numeric {
                values: faces.clone(),
                subtotal,
            }
        };

        groups.push(GroupOutcome {
            kind,
            faces,
            results,
        });
    }

    Ok(RollOutcome {
        groups,
        grand_total,
    })
}
