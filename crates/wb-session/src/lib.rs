//! Interactive dice-pool sessions for Würfelbecher.
//!
//! A session walks one user through building a dice pool (die type, then
//! count, then "add more" or "roll now") using short-lived prompts. Each
//! prompt carries an identity, so a button press from a superseded or expired
//! prompt is recognised as stale and dropped. Rolling announces the result in
//! the channel and immediately opens a fresh session.
//!
//! [`SessionMachine`] is the synchronous state machine; [`SessionHub`] routes
//! transport events to machines and runs the expiry timers on tokio.

pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod ids;
pub mod lifecycle;
pub mod machine;
pub mod prompt;
pub mod render;

pub use config::{MAX_DICE_PER_SELECTION, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use event::{Decision, Interaction, Outbound};
pub use hub::SessionHub;
pub use ids::{ChannelId, PromptId, SessionId, UserId};
pub use lifecycle::{Deadline, ViewLifecycle};
pub use machine::{SessionMachine, SessionState, Transition};
pub use prompt::{
    ButtonStyle, OptionValue, Prompt, PromptBody, PromptEngine, PromptOption, Stage, Visibility,
};
