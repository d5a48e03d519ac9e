//! Inbound interactions and outbound messages.
//!
//! These are the only shapes a transport needs to speak: it turns button
//! presses and menu selections into [`Interaction`]s and delivers every
//! [`Outbound`] either privately to one user or publicly to a channel.

use serde::{Deserialize, Serialize};

use wb_dice::DieKind;

use crate::ids::{ChannelId, PromptId, SessionId, UserId};
use crate::prompt::Prompt;

/// The choice offered once dice have been added to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Go back to the die-type prompt, keeping the pool.
    AddMore,
    /// Roll the whole pool.
    RollNow,
}

/// An event delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    /// A user mentioned the bot or invoked its command.
    SessionStart {
        /// The user who asked for dice.
        invoker: UserId,
        /// Where the invitation should be posted.
        channel: ChannelId,
    },
    /// A die type was picked.
    DieTypeSelected {
        /// Target session.
        session: SessionId,
        /// The prompt the selection was made on.
        prompt: PromptId,
        /// Who made the selection.
        user: UserId,
        /// The selected die.
        kind: DieKind,
    },
    /// A count was picked.
    CountSelected {
        /// Target session.
        session: SessionId,
        /// The prompt the selection was made on.
        prompt: PromptId,
        /// Who made the selection.
        user: UserId,
        /// The selected count.
        count: u8,
    },
    /// Add More or Roll Now was pressed.
    PoolDecision {
        /// Target session.
        session: SessionId,
        /// The prompt the selection was made on.
        prompt: PromptId,
        /// Who made the selection.
        user: UserId,
        /// The button pressed.
        decision: Decision,
    },
}

impl Interaction {
    /// The session this event is addressed to (`None` for a session start).
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::SessionStart { .. } => None,
            Self::DieTypeSelected { session, .. }
            | Self::CountSelected { session, .. }
            | Self::PoolDecision { session, .. } => Some(*session),
        }
    }

    /// The prompt this event was issued from (`None` for a session start).
    pub fn prompt(&self) -> Option<PromptId> {
        match self {
            Self::SessionStart { .. } => None,
            Self::DieTypeSelected { prompt, .. }
            | Self::CountSelected { prompt, .. }
            | Self::PoolDecision { prompt, .. } => Some(*prompt),
        }
    }

    /// The user behind this event.
    pub fn user(&self) -> &UserId {
        match self {
            Self::SessionStart { invoker, .. } => invoker,
            Self::DieTypeSelected { user, .. }
            | Self::CountSelected { user, .. }
            | Self::PoolDecision { user, .. } => user,
        }
    }
}

/// A message for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Visible only to `target`.
    Ephemeral {
        /// The user who sees the message.
        target: UserId,
        /// Message text (markdown).
        text: String,
        /// Interactive choices attached to the message.
        prompt: Option<Prompt>,
    },
    /// Visible to everyone in `channel`.
    Public {
        /// Where to post.
        channel: ChannelId,
        /// Message text (markdown).
        text: String,
        /// Interactive choices attached to the message.
        prompt: Option<Prompt>,
    },
}

impl Outbound {
    /// Message text.
    pub fn text(&self) -> &str {
        match self {
            Self::Ephemeral { text, .. } | Self::Public { text, .. } => text,
        }
    }

    /// The attached prompt, if any.
    pub fn prompt(&self) -> Option<&Prompt> {
        match self {
            Self::Ephemeral { prompt, .. } | Self::Public { prompt, .. } => prompt.as_ref(),
        }
    }

    /// Returns true for channel-wide messages.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let session = SessionId::generate();
        let prompt = PromptId::generate();
        let event = Interaction::CountSelected {
            session,
            prompt,
            user: UserId::new("ana"),
            count: 3,
        };
        assert_eq!(event.session(), Some(session));
        assert_eq!(event.prompt(), Some(prompt));
        assert_eq!(event.user().as_str(), "ana");

        let start = Interaction::SessionStart {
            invoker: UserId::new("ana"),
            channel: ChannelId::new("tavern"),
        };
        assert_eq!(start.session(), None);
        assert_eq!(start.prompt(), None);
    }

    #[test]
    fn interactions_use_a_type_tag() {
        let json = r#"{"type":"session_start","invoker":"ana","channel":"tavern"}"#;
        let event: Interaction = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            Interaction::SessionStart {
                invoker: UserId::new("ana"),
                channel: ChannelId::new("tavern"),
            }
        );
    }

    #[test]
    fn unknown_die_is_rejected_by_the_decoder() {
        let json = format!(
            r#"{{"type":"die_type_selected","session":"{}","prompt":"{}","user":"ana","kind":"d7"}}"#,
            SessionId::generate(),
            PromptId::generate()
        );
        assert!(serde_json::from_str::<Interaction>(&json).is_err());
    }

    #[test]
    fn outbound_accessors() {
        let msg = Outbound::Public {
            channel: ChannelId::new("tavern"),
            text: "hello".into(),
            prompt: None,
        };
        assert!(msg.is_public());
        assert_eq!(msg.text(), "hello");
        assert!(msg.prompt().is_none());
    }
}
