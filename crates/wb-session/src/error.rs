//! Error types for dice-pool sessions.

use thiserror::Error;

use wb_dice::DiceError;

use crate::ids::{PromptId, SessionId};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The event refers to a prompt that is no longer active.
    #[error("stale event for prompt {prompt} in session {session}")]
    Stale {
        /// The session the event was addressed to.
        session: SessionId,
        /// The prompt the event was issued from.
        prompt: PromptId,
    },

    /// No live session has this id (never existed, resolved, or expired).
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    /// The event does not fit the prompt it references.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Rolling the pool failed.
    #[error("{0}")]
    Dice(#[from] DiceError),
}

impl SessionError {
    /// Returns true for errors that are recovered by dropping the event
    /// without telling the user.
    pub fn is_silent(&self) -> bool {
        !matches!(self, Self::Dice(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dice_errors_are_visible() {
        let stale = SessionError::Stale {
            session: SessionId::generate(),
            prompt: PromptId::generate(),
        };
        assert!(stale.is_silent());
        assert!(SessionError::UnknownSession(SessionId::generate()).is_silent());
        assert!(SessionError::InvalidSelection("count 9".into()).is_silent());

        let entropy = SessionError::from(DiceError::EntropyUnavailable("gone".into()));
        assert!(!entropy.is_silent());
        assert_eq!(entropy.to_string(), "entropy source unavailable: gone");
    }
}
