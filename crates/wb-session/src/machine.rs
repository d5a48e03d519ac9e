//! The per-session state machine.
//!
//! ```text
//! Created -> AwaitingDieType -> AwaitingCount -> AwaitingPoolDecision -> Resolved
//!                 ^                                      |
//!                 +--------------- Add More -------------+
//! ```
//!
//! Any non-terminal state moves to `Expired` when its prompt times out. Every
//! selection must name the currently active prompt; anything else is stale and
//! changes nothing.
//!
//! A session showing the public invitation is shared by the whole channel. A
//! die-type press on it never moves the invitation itself: it opens a new
//! session owned by whoever pressed, already waiting for a count.

use std::time::Instant;

use tracing::{debug, info};

use wb_dice::{DicePool, DieKind, RandomSource, resolve};

use crate::config::{MAX_DICE_PER_SELECTION, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::event::{Decision, Interaction, Outbound};
use crate::ids::{ChannelId, PromptId, SessionId, UserId};
use crate::lifecycle::{Deadline, ViewLifecycle};
use crate::prompt::{Prompt, PromptEngine, Stage, Visibility};
use crate::render;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but no prompt shown yet.
    Created,
    /// Waiting for a die type.
    AwaitingDieType,
    /// Waiting for a count of the given die type.
    AwaitingCount(DieKind),
    /// Waiting for Add More or Roll Now.
    AwaitingPoolDecision,
    /// The pool was rolled.
    Resolved,
    /// The active prompt timed out; the pool was discarded.
    Expired,
}

impl SessionState {
    /// Returns true for `Resolved` and `Expired`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Expired)
    }
}

/// What an accepted event produced.
#[derive(Debug)]
pub struct Transition {
    /// Messages to deliver, in order.
    pub outbound: Vec<Outbound>,
    /// A session opened by this event, already showing its first prompt:
    /// the next invitation after a roll, or a user's own session after a
    /// press on the invitation.
    pub successor: Option<SessionMachine>,
}

impl Transition {
    fn emit(outbound: Outbound) -> Self {
        Self {
            outbound: vec![outbound],
            successor: None,
        }
    }
}

/// One user's dice-pool session.
#[derive(Debug)]
pub struct SessionMachine {
    id: SessionId,
    owner: UserId,
    channel: ChannelId,
    state: SessionState,
    pool: DicePool,
    active: Option<Prompt>,
    deadline: Deadline,
    config: SessionConfig,
    lifecycle: ViewLifecycle,
}

impl SessionMachine {
    /// Create a session for `owner` in `channel`, in the `Created` state.
    pub fn new(owner: UserId, channel: ChannelId, config: SessionConfig) -> Self {
        let lifecycle = ViewLifecycle::from_config(&config);
        Self {
            id: SessionId::generate(),
            owner,
            channel,
            state: SessionState::Created,
            pool: DicePool::new(),
            active: None,
            deadline: Deadline::none(),
            config,
            lifecycle,
        }
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The user this session belongs to.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// The channel announcements go to.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Dice accumulated so far.
    pub fn pool(&self) -> &DicePool {
        &self.pool
    }

    /// The prompt currently accepting input.
    pub fn active_prompt(&self) -> Option<&Prompt> {
        self.active.as_ref()
    }

    /// When the active prompt expires.
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Returns true while the active prompt is the public invitation.
    pub fn is_invitation(&self) -> bool {
        self.active.as_ref().is_some_and(|p| {
            p.visibility == Visibility::Public && p.stage == Stage::ChooseDieType
        })
    }

    /// Show the public invitation. Does nothing unless the session is `Created`.
    pub fn start(&mut self, now: Instant) -> Vec<Outbound> {
        if self.state != SessionState::Created {
            return Vec::new();
        }
        self.state = SessionState::AwaitingDieType;
        info!(session = %self.id, user = %self.owner, "session started");
        vec![self.present(Stage::ChooseDieType, Visibility::Public, now)]
    }

    /// Apply a selection event.
    ///
    /// Stale and malformed events leave the session untouched. A failed roll
    /// also leaves it untouched, so the user can press Roll Now again.
    pub fn handle(
        &mut self,
        event: &Interaction,
        now: Instant,
        random: &dyn RandomSource,
    ) -> SessionResult<Transition> {
        self.check_current(event, now)?;
        if self.is_invitation() {
            return self.claim(event, now);
        }

        match (self.state, event) {
            (SessionState::AwaitingDieType, Interaction::DieTypeSelected { kind, .. }) => {
                self.state = SessionState::AwaitingCount(*kind);
                let stage = Stage::ChooseCount { kind: *kind };
                Ok(Transition::emit(self.present(stage, Visibility::Ephemeral, now)))
            }
            (SessionState::AwaitingCount(kind), Interaction::CountSelected { count, .. }) => {
                if !(1..=MAX_DICE_PER_SELECTION).contains(count) {
                    return Err(SessionError::InvalidSelection(format!(
                        "count {count} outside 1..={MAX_DICE_PER_SELECTION}"
                    )));
                }
                self.pool.add(kind, u32::from(*count));
                self.state = SessionState::AwaitingPoolDecision;
                debug!(session = %self.id, pool = %self.pool, "dice added");
                let stage = Stage::AfterAdd {
                    kind,
                    count: *count,
                };
                Ok(Transition::emit(self.present(stage, Visibility::Ephemeral, now)))
            }
            (SessionState::AwaitingPoolDecision, Interaction::PoolDecision { decision, .. }) => {
                match decision {
                    Decision::AddMore => {
                        self.state = SessionState::AwaitingDieType;
                        Ok(Transition::emit(self.present(
                            Stage::ChooseDieType,
                            Visibility::Ephemeral,
                            now,
                        )))
                    }
                    Decision::RollNow => self.roll(now, random),
                }
            }
            (state, _) => Err(SessionError::InvalidSelection(format!(
                "event does not fit state {state:?}"
            ))),
        }
    }

    /// Expire the session if `prompt` is still the active prompt.
    ///
    /// Returns true if the session moved to `Expired`.
    pub fn expire(&mut self, prompt: PromptId) -> bool {
        let is_active = self.active.as_ref().is_some_and(|p| p.id == prompt);
        if self.state.is_terminal() || !is_active {
            return false;
        }
        self.mark_expired();
        true
    }

    /// Expire the session if its deadline has passed.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        if self.state.is_terminal() || !self.deadline.is_elapsed(now) {
            return false;
        }
        self.mark_expired();
        true
    }

    fn check_current(&mut self, event: &Interaction, now: Instant) -> SessionResult<()> {
        let (Some(session), Some(prompt)) = (event.session(), event.prompt()) else {
            return Err(SessionError::InvalidSelection(
                "session already started".to_string(),
            ));
        };
        if session != self.id {
            return Err(SessionError::InvalidSelection(format!(
                "event for session {session} delivered to {}",
                self.id
            )));
        }

        self.expire_if_due(now);
        let is_active = self.active.as_ref().is_some_and(|p| p.id == prompt);
        if self.state.is_terminal() || !is_active {
            return Err(SessionError::Stale { session, prompt });
        }

        if !self.is_invitation() && event.user() != &self.owner {
            return Err(SessionError::InvalidSelection(format!(
                "{} does not own session {}",
                event.user(),
                self.id
            )));
        }
        Ok(())
    }

    /// Open a session for whoever pressed a die type on the invitation.
    fn claim(&self, event: &Interaction, now: Instant) -> SessionResult<Transition> {
        let Interaction::DieTypeSelected { user, kind, .. } = event else {
            return Err(SessionError::InvalidSelection(format!(
                "invitation {} only takes a die type",
                self.id
            )));
        };

        let mut session =
            SessionMachine::new(user.clone(), self.channel.clone(), self.config.clone());
        session.state = SessionState::AwaitingCount(*kind);
        info!(
            invitation = %self.id,
            session = %session.id,
            user = %user,
            kind = %kind,
            "session opened from invitation"
        );
        let stage = Stage::ChooseCount { kind: *kind };
        let prompt = session.present(stage, Visibility::Ephemeral, now);

        Ok(Transition {
            outbound: vec![prompt],
            successor: Some(session),
        })
    }

    fn roll(&mut self, now: Instant, random: &dyn RandomSource) -> SessionResult<Transition> {
        let outcome = resolve(&self.pool, random)?;
        let summary = render::roll_announcement(&self.owner, &self.pool, &outcome);
        info!(
            session = %self.id,
            user = %self.owner,
            pool = %self.pool,
            total = outcome.grand_total,
            "pool rolled"
        );

        self.state = SessionState::Resolved;
        self.active = None;
        self.deadline = Deadline::none();
        self.pool = DicePool::new();

        let mut successor =
            SessionMachine::new(self.owner.clone(), self.channel.clone(), self.config.clone());
        let mut outbound = vec![Outbound::Public {
            channel: self.channel.clone(),
            text: summary,
            prompt: None,
        }];
        outbound.extend(successor.start(now));

        Ok(Transition {
            outbound,
            successor: Some(successor),
        })
    }

    fn mark_expired(&mut self) {
        info!(session = %self.id, state = ?self.state, "session expired");
        self.state = SessionState::Expired;
        self.active = None;
        self.deadline = Deadline::none();
        self.pool = DicePool::new();
    }

    /// Replace the active prompt with a fresh one for `stage`.
    fn present(&mut self, stage: Stage, visibility: Visibility, now: Instant) -> Outbound {
        let timeout = self.lifecycle.timeout_for(&stage, visibility);
        let body = PromptEngine::build(&stage, &self.pool, &self.owner);
        let prompt = Prompt {
            id: PromptId::generate(),
            session: self.id,
            stage,
            visibility,
            timeout,
            body,
        };
        self.deadline = Deadline::after(now, timeout);
        self.active = Some(prompt.clone());

        let text = prompt.body.text.clone();
        match visibility {
            Visibility::Public => Outbound::Public {
                channel: self.channel.clone(),
                text,
                prompt: Some(prompt),
            },
            Visibility::Ephemeral => Outbound::Ephemeral {
                target: self.owner.clone(),
                text,
                prompt: Some(prompt),
            },
        }
    }
}
