//! Prompt expiry.
//!
//! Every prompt except the public invitation stops accepting input after a
//! fixed time. [`ViewLifecycle`] picks the timeout for a prompt and
//! [`Deadline`] tracks when it runs out.

use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::prompt::{Stage, Visibility};

/// Timeout policy derived from a [`SessionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLifecycle {
    invitation: Option<Duration>,
    die_type: Duration,
    count: Duration,
    decision: Duration,
}

impl ViewLifecycle {
    /// Build the policy from session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            invitation: config.invitation_timeout,
            die_type: config.die_type_timeout,
            count: config.count_timeout,
            decision: config.decision_timeout,
        }
    }

    /// How long a prompt for `stage` stays live.
    pub fn timeout_for(&self, stage: &Stage, visibility: Visibility) -> Option<Duration> {
        match (stage, visibility) {
            (Stage::ChooseDieType, Visibility::Public) => self.invitation,
            (Stage::ChooseDieType, Visibility::Ephemeral) => Some(self.die_type),
            (Stage::ChooseCount { .. }, _) => Some(self.count),
            (Stage::AfterAdd { .. }, _) => Some(self.decision),
        }
    }
}

/// The moment a prompt stops accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never elapses.
    pub fn none() -> Self {
        Self(None)
    }

    /// Elapse `timeout` after `now`.
    ///
    /// Never elapses if `timeout` is `None` or reaches past what the clock
    /// can represent.
    pub fn after(now: Instant, timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| now.checked_add(t)))
    }

    /// The instant it elapses, if bounded.
    pub fn at(&self) -> Option<Instant> {
        self.0
    }

    /// Returns true once `now` has reached the deadline.
    pub fn is_elapsed(&self, now: Instant) -> bool {
        self.0.is_some_and(|at| now >= at)
    }

    /// Time left before the deadline, if bounded.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(now))
    }
}
