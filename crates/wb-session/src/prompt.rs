//! Prompt construction.
//!
//! [`PromptEngine`] turns a session stage into the text and option set shown
//! to the user, independent of any transport. Option sets stay small: eight
//! die types, five counts, or two buttons.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use wb_dice::{DicePool, DieKind};

use crate::config::MAX_DICE_PER_SELECTION;
use crate::event::{Decision, Interaction};
use crate::ids::{PromptId, SessionId, UserId};
use crate::render::mention;

/// Opening line of every invitation.
pub const INVITATION_TEXT: &str = "**Let's roll babay!**";

/// Which question a prompt asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Pick one die type from the catalog.
    ChooseDieType,
    /// Pick how many dice of `kind` to add.
    ChooseCount {
        /// The die type picked on the previous prompt.
        kind: DieKind,
    },
    /// Dice were added; add more or roll.
    AfterAdd {
        /// The die type just added.
        kind: DieKind,
        /// How many were added.
        count: u8,
    },
}

/// Who can see a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Posted to the channel.
    Public,
    /// Shown to the session owner only.
    Ephemeral,
}

/// Presentation hint for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Main choices (die types, counts).
    Primary,
    /// Secondary action.
    Secondary,
    /// Confirming action.
    Success,
}

/// The value an option carries back when chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionValue {
    /// A die type.
    Die(DieKind),
    /// A count in `1..=MAX_DICE_PER_SELECTION`.
    Count(u8),
    /// Add More or Roll Now.
    Decision(Decision),
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOption {
    /// What choosing this option means.
    pub value: OptionValue,
    /// Button or menu label.
    pub label: String,
    /// Optional secondary text (menu descriptions).
    pub description: Option<String>,
    /// Presentation hint.
    pub style: ButtonStyle,
}

/// Prompt text and options, before an identity is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBody {
    /// Message text (markdown).
    pub text: String,
    /// The choices, in display order.
    pub options: Vec<PromptOption>,
}

/// A prompt bound to the session that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Identity used to detect stale events.
    pub id: PromptId,
    /// Owning session.
    pub session: SessionId,
    /// The question asked.
    pub stage: Stage,
    /// Who can see it.
    pub visibility: Visibility,
    /// How long it accepts input (`None` = until superseded).
    pub timeout: Option<Duration>,
    /// Text and options.
    pub body: PromptBody,
}

impl Prompt {
    /// Find the option a typed answer refers to.
    ///
    /// Tries the label (case-insensitive), then die tags and decision
    /// keywords ("more", "roll"), then a 1-based option number.
    pub fn option_for(&self, answer: &str) -> Option<&PromptOption> {
        let answer = answer.trim();
        let options = &self.body.options;

        if let Some(option) = options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(answer))
        {
            return Some(option);
        }

        let lower = answer.to_lowercase();
        let keyword = match lower.as_str() {
            "more" | "add" | "add more" => Some(OptionValue::Decision(Decision::AddMore)),
            "roll" | "roll now" | "go" => Some(OptionValue::Decision(Decision::RollNow)),
            other => DieKind::from_str_tag(other).map(OptionValue::Die),
        };
        if let Some(option) = keyword.and_then(|value| options.iter().find(|o| o.value == value)) {
            return Some(option);
        }

        let index = answer.parse::<usize>().ok()?;
        options.get(index.checked_sub(1)?)
    }

    /// The event a transport sends when `user` picks `option`.
    pub fn interaction_for(&self, option: &PromptOption, user: UserId) -> Interaction {
        let session = self.session;
        let prompt = self.id;
        match option.value {
            OptionValue::Die(kind) => Interaction::DieTypeSelected {
                session,
                prompt,
                user,
                kind,
            },
            OptionValue::Count(count) => Interaction::CountSelected {
                session,
                prompt,
                user,
                count,
            },
            OptionValue::Decision(decision) => Interaction::PoolDecision {
                session,
                prompt,
                user,
                decision,
            },
        }
    }
}

/// Builds prompt bodies for each stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEngine;

impl PromptEngine {
    /// Build the text and options `owner` sees for `stage`, given the pool
    /// so far.
    pub fn build(stage: &Stage, pool: &DicePool, owner: &UserId) -> PromptBody {
        match *stage {
            Stage::ChooseDieType => Self::die_types(pool),
            Stage::ChooseCount { kind } => Self::counts(kind, pool, owner),
            Stage::AfterAdd { kind, count } => Self::after_add(kind, count),
        }
    }

    fn die_types(pool: &DicePool) -> PromptBody {
        let text = if pool.is_empty() {
            INVITATION_TEXT.to_string()
        } else {
            format!("**Current pool:** {pool}\n**Select more dice to add:**")
        };
        let options = DieKind::CATALOG
            .iter()
            .map(|&kind| PromptOption {
                value: OptionValue::Die(kind),
                label: kind.label().to_string(),
                description: None,
                style: ButtonStyle::Primary,
            })
            .collect();
        PromptBody { text, options }
    }

    fn counts(kind: DieKind, pool: &DicePool, owner: &UserId) -> PromptBody {
        // The first count prompt greets the user; later ones just ask.
        let text = if pool.is_empty() {
            format!(
                "🎲 {} Select how many **{}** to roll:",
                mention(owner),
                kind.display_name()
            )
        } else {
            format!("🎲 Select how many **{}** to add:", kind.display_name())
        };
        let options = (1..=MAX_DICE_PER_SELECTION)
            .map(|n| PromptOption {
                value: OptionValue::Count(n),
                label: n.to_string(),
                description: Some(if n == 1 {
                    "Add 1 die".to_string()
                } else {
                    format!("Add {n} dice")
                }),
                style: ButtonStyle::Primary,
            })
            .collect();
        PromptBody { text, options }
    }

    fn after_add(kind: DieKind, count: u8) -> PromptBody {
        PromptBody {
            text: format!("Added **{count} × {}** to your pool.", kind.pool_key()),
            options: vec![
                PromptOption {
                    value: OptionValue::Decision(Decision::AddMore),
                    label: "Add More Dice".to_string(),
                    description: None,
                    style: ButtonStyle::Secondary,
                },
                PromptOption {
                    value: OptionValue::Decision(Decision::RollNow),
                    label: "Roll Now!".to_string(),
                    description: None,
                    style: ButtonStyle::Success,
                },
            ],
        }
    }
}
