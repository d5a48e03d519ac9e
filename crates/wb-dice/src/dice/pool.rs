//! Dice pool accumulation.

use serde::{Deserialize, Serialize};

use super::DieKind;
use crate::error::{DiceError, DiceResult};

/// Most dice a notation string may ask for, across all of its terms.
pub const MAX_NOTATION_DICE: u32 = 1_000;

/// Dice waiting to be rolled together, grouped by kind.
///
/// Kinds keep the order in which they were first added, so summaries read the
/// way the user built the pool. A kind that is absent has zero dice; a kind
/// that is present always has at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    entries: Vec<(DieKind, u32)>,
}

impl DicePool {
    /// Create an empty dice pool.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add `count` dice of the given kind. Adding zero dice does nothing.
    ///
    /// Counts saturate at `u32::MAX`.
    pub fn add(&mut self, kind: DieKind, count: u32) {
        if count == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = existing.saturating_add(count),
            None => self.entries.push((kind, count)),
        }
    }

    /// Builder-style variant of [`DicePool::add`].
    pub fn with(mut self, kind: DieKind, count: u32) -> Self {
        self.add(kind, count);
        self
    }

    /// Returns true if no dice have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(kind, count)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (DieKind, u32)> + '_ {
        self.entries.iter().copied()
    }

    /// How many dice of `kind` are in the pool.
    pub fn count_of(&self, kind: DieKind) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }

    /// Total number of dice across all kinds.
    pub fn total_dice(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, (_, n)| total.saturating_add(*n))
    }
}

impl std::fmt::Display for DicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(kind, count)| format!("{count}×{kind}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Parse notation like "3d6 2plot d20" or "2d8, 1d4".
///
/// At most [`MAX_NOTATION_DICE`] dice in total.
impl std::str::FromStr for DicePool {
    type Err = DiceError;

    fn from_str(s: &str) -> DiceResult<Self> {
        let mut pool = DicePool::new();
        let tokens = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());

        for token in tokens {
            let split = token
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| DiceError::InvalidNotation(token.to_string()))?;
            let (digits, tag) = token.split_at(split);
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<u32>()
                    .map_err(|_| DiceError::InvalidNotation(token.to_string()))?
            };
            if count == 0 {
                return Err(DiceError::InvalidNotation(token.to_string()));
            }
            let kind = DieKind::from_str_tag(tag)
                .or_else(|| DieKind::from_str_tag(&format!("d{tag}")))
                .ok_or_else(|| DiceError::UnknownDie(tag.to_string()))?;
            pool.add(kind, count);
            if pool.total_dice() > MAX_NOTATION_DICE {
                return Err(DiceError::InvalidNotation(format!(
                    "{} asks for more than {MAX_NOTATION_DICE} dice",
                    s.trim()
                )));
            }
        }

        if pool.is_empty() {
            return Err(DiceError::InvalidNotation(s.trim().to_string()));
        }
        Ok(pool)
    }
}
