//! Configuration for dice-pool sessions.

use std::time::Duration;

/// Largest count offered in a single count prompt.
pub const MAX_DICE_PER_SELECTION: u8 = 5;

/// Configuration shared by every session a hub creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of the public invitation prompt (`None` = never expires).
    pub invitation_timeout: Option<Duration>,
    /// Lifetime of the "select more dice" prompt after Add More.
    pub die_type_timeout: Duration,
    /// Lifetime of the "how many dice" prompt.
    pub count_timeout: Duration,
    /// Lifetime of the "add more or roll now" prompt.
    pub decision_timeout: Duration,
    /// Whether new sessions may be started at all.
    pub accepting_invocations: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            invitation_timeout: None,
            die_type_timeout: Duration::from_secs(20),
            count_timeout: Duration::from_secs(20),
            decision_timeout: Duration::from_secs(30),
            accepting_invocations: true,
        }
    }
}

impl SessionConfig {
    /// Set the invitation lifetime.
    pub fn with_invitation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invitation_timeout = timeout;
        self
    }

    /// Set the lifetime of the die-type prompt shown after Add More.
    pub fn with_die_type_timeout(mut self, timeout: Duration) -> Self {
        self.die_type_timeout = timeout;
        self
    }

    /// Set the lifetime of the count prompt.
    pub fn with_count_timeout(mut self, timeout: Duration) -> Self {
        self.count_timeout = timeout;
        self
    }

    /// Set the lifetime of the add-more-or-roll prompt.
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = timeout;
        self
    }

    /// Enable or disable new sessions.
    pub fn accepting(mut self, accepting: bool) -> Self {
        self.accepting_invocations = accepting;
        self
    }
}
